use super::domain::RetentionOffer;

/// Scores strictly above this earn the full refund offer.
pub const FULL_REFUND_ABOVE: i32 = 80;
/// Scores strictly above this (and not above [`FULL_REFUND_ABOVE`]) earn the discount.
pub const DISCOUNT_ABOVE: i32 = 50;

pub fn select_offer(risk_score: i32) -> RetentionOffer {
    if risk_score > FULL_REFUND_ABOVE {
        RetentionOffer::FullRefundAndFreeMonth
    } else if risk_score > DISCOUNT_ABOVE {
        RetentionOffer::HalfOffNextBill
    } else {
        RetentionOffer::FreeSpeedUpgrade
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_fall_to_lower_band() {
        assert_eq!(select_offer(81), RetentionOffer::FullRefundAndFreeMonth);
        assert_eq!(select_offer(80), RetentionOffer::HalfOffNextBill);
        assert_eq!(select_offer(51), RetentionOffer::HalfOffNextBill);
        assert_eq!(select_offer(50), RetentionOffer::FreeSpeedUpgrade);
    }

    #[test]
    fn every_score_maps_to_its_band() {
        for score in -20..=150 {
            let expected = if score > 80 {
                "Full Refund + 1 Month Free Service"
            } else if score > 50 {
                "50% Discount on Next Bill"
            } else {
                "Free Speed Upgrade"
            };
            assert_eq!(select_offer(score).label(), expected, "score {score}");
        }
    }
}
