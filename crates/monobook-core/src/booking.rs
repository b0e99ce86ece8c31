use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A booking record as shown on the confirmation card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: Option<String>,
    /// Host-reported status, lowercased (e.g. `"confirmed"`, `"pending"`).
    pub status: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub nights: Option<u32>,
    pub guests: Option<u32>,
    pub guest_name: Option<String>,
    pub room_name: Option<String>,
    pub property_id: Option<String>,
    pub property_name: Option<String>,
    pub pricing: PricingBreakdown,
    /// Tool-reported failure.
    pub error: Option<String>,
}

impl BookingRecord {
    /// Number of nights, preferring the explicit value over the date span.
    #[must_use]
    pub fn stay_nights(&self) -> Option<u32> {
        self.nights.or_else(|| {
            let (check_in, check_out) = (self.check_in?, self.check_out?);
            let days = (check_out - check_in).num_days();
            u32::try_from(days).ok().filter(|d| *d > 0)
        })
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status.as_deref() == Some("confirmed")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub nightly_rate: Option<Decimal>,
    pub subtotal: Option<Decimal>,
    pub taxes: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub total: Option<Decimal>,
    pub currency: Option<String>,
}

impl PricingBreakdown {
    /// The total to display: the reported total, or the sum of the parts
    /// when only the parts are known.
    #[must_use]
    pub fn effective_total(&self) -> Option<Decimal> {
        self.total.or_else(|| {
            let subtotal = self.subtotal?;
            Some(subtotal + self.taxes.unwrap_or_default() + self.fees.unwrap_or_default())
        })
    }
}
