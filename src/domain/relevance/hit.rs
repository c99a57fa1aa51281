//! Raw and scored search candidates.

use serde::{Deserialize, Serialize};

/// One raw candidate record from the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Listing title.
    pub title: String,
    /// Listed price, if the provider returned one.
    pub price: Option<f64>,
    /// Selling merchant.
    pub merchant: Option<String>,
    /// Listing rating.
    pub rating: Option<f64>,
    /// Link to the listing.
    pub link: Option<String>,
}

impl SearchHit {
    /// Creates a hit with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            merchant: None,
            rating: None,
            link: None,
        }
    }

    /// Sets the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the merchant.
    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    /// Sets the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the listing link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// A candidate paired with its relevance score.
///
/// Ephemeral: exists only for the duration of one relevance evaluation,
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The raw candidate.
    pub candidate: SearchHit,
    /// Relevance score in `[0, 1]`.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let hit = SearchHit::new("Apple iPhone 15 128GB Blue")
            .with_price(799.0)
            .with_merchant("TechStore")
            .with_rating(4.7)
            .with_link("https://example.com/p/1");

        assert_eq!(hit.title, "Apple iPhone 15 128GB Blue");
        assert_eq!(hit.price, Some(799.0));
        assert_eq!(hit.merchant.as_deref(), Some("TechStore"));
    }

    #[test]
    fn deserializes_from_provider_shape() {
        let json = r#"{"title":"USB-C Cable 2m","price":9.99,"merchant":null,"rating":4.1,"link":null}"#;
        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.title, "USB-C Cable 2m");
        assert_eq!(hit.price, Some(9.99));
        assert!(hit.merchant.is_none());
    }
}
