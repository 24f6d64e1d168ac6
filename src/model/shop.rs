use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::id::{random_code, Id};

pub const VOUCHER_CODE_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub price_cents: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u64,
}

impl NewProduct {
    pub fn into_product(self) -> Result<Product> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::bad_request("Product name must not be empty"));
        }
        Ok(Product {
            id: Id::generate(),
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price_cents: self.price_cents,
            created_at: Utc::now(),
        })
    }
}

/// A purchased product addressed to a recipient, redeemable once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: Id,
    pub code: String,
    pub product_id: Id,
    pub product_name: String,
    pub recipient: String,
    pub purchaser_id: Id,
    pub claimed: bool,
    pub claimed_by: Option<Id>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    pub fn new(product: &Product, recipient: &str, purchaser_id: Id) -> Result<Self> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(Error::bad_request("Voucher recipient must not be empty"));
        }
        Ok(Self {
            id: Id::generate(),
            code: random_code(VOUCHER_CODE_LENGTH),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            recipient: recipient.to_string(),
            purchaser_id,
            claimed: false,
            claimed_by: None,
            claimed_at: None,
            created_at: Utc::now(),
        })
    }

    /// Redeem the voucher for `user_id`, who must present the recipient
    /// contact it was bought for.
    pub fn claim(&mut self, contact: &str, user_id: Id) -> Result<()> {
        if self.claimed {
            return Err(Error::bad_request(format!(
                "Voucher {} has already been claimed",
                self.code
            )));
        }
        if !contact.trim().eq_ignore_ascii_case(&self.recipient) {
            return Err(Error::Forbidden(format!(
                "Voucher {} is addressed to someone else",
                self.code
            )));
        }
        self.claimed = true;
        self.claimed_by = Some(user_id);
        self.claimed_at = Some(Utc::now());
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRequest {
    pub product_id: Id,
    pub recipient: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClaimRequest {
    pub recipient: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        NewProduct {
            name: "Beach towel".into(),
            description: String::new(),
            price_cents: 2500,
        }
        .into_product()
        .unwrap()
    }

    #[test]
    fn voucher_claims_once() {
        let mut voucher = Voucher::new(&product(), "ana@example.com", Id::generate()).unwrap();
        assert_eq!(voucher.code.len(), VOUCHER_CODE_LENGTH);

        let claimer = Id::generate();
        voucher.claim("ANA@example.com ", claimer.clone()).unwrap();
        assert!(voucher.claimed);
        assert_eq!(voucher.claimed_by, Some(claimer.clone()));

        assert!(matches!(
            voucher.claim("ana@example.com", claimer),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn voucher_requires_matching_recipient() {
        let mut voucher = Voucher::new(&product(), "ana@example.com", Id::generate()).unwrap();
        assert!(matches!(
            voucher.claim("bob@example.com", Id::generate()),
            Err(Error::Forbidden(_))
        ));
        assert!(!voucher.claimed);
    }

    #[test]
    fn blank_recipient_rejected() {
        assert!(Voucher::new(&product(), "  ", Id::generate()).is_err());
    }
}
