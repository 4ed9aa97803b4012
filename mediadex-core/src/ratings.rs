use std::collections::HashMap;

use mediadex_model::{ContentPayload, ContentType, ContentUpdate, ServiceKey};
use ordered_float::OrderedFloat;

use crate::error::{IndexError, Result};

/// Per-service rating of one record. Like/dislike services store 0.0 or 1.0,
/// numerical services a fraction in `0.0..=1.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingState {
    ratings: HashMap<ServiceKey, f64>,
}

impl RatingState {
    pub fn new(ratings: HashMap<ServiceKey, f64>) -> Self {
        Self { ratings }
    }

    pub fn rating(&self, service_key: &ServiceKey) -> Option<f64> {
        self.ratings.get(service_key).copied()
    }

    /// Ratings for several services in order, hashable for grouping.
    pub fn rating_slice(&self, service_keys: &[ServiceKey]) -> Vec<Option<OrderedFloat<f64>>> {
        service_keys
            .iter()
            .map(|key| self.rating(key).map(OrderedFloat))
            .collect()
    }

    pub fn process_content_update(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
    ) -> Result<()> {
        let ContentPayload::Ratings { rating, .. } = &update.payload else {
            return Err(IndexError::invalid_update(update, "expected a ratings payload"));
        };
        if update.data_type != ContentType::Ratings {
            return Err(IndexError::invalid_update(update, "expected ratings content"));
        }

        match rating {
            Some(value) => {
                self.ratings.insert(service_key, *value);
            }
            None => {
                self.ratings.remove(&service_key);
            }
        }
        Ok(())
    }

    pub fn reset_service(&mut self, service_key: ServiceKey) {
        self.ratings.remove(&service_key);
    }
}
