use crate::decimal::{Money, Rate};

/// late penalty calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct LatePenalty {
    pub penalty_amount: Money,
    pub daily_rate: Rate,
    pub days_charged: u32,
    pub base: Money,
}

impl LatePenalty {
    fn none(base: Money, daily_rate: Rate) -> Self {
        Self {
            penalty_amount: Money::ZERO,
            daily_rate,
            days_charged: 0,
            base,
        }
    }
}

/// simple daily late penalty: base * daily rate * days late
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatePenaltyEngine {
    pub daily_rate: Rate,
}

impl LatePenaltyEngine {
    pub fn new(daily_rate: Rate) -> Self {
        Self { daily_rate }
    }

    /// penalty on `base` for `days_late`; zero when the rate is not positive or nothing is late
    pub fn calculate(&self, base: Money, days_late: u32) -> LatePenalty {
        if !self.daily_rate.is_positive() || days_late == 0 || !base.is_positive() {
            return LatePenalty::none(base, self.daily_rate);
        }

        LatePenalty {
            penalty_amount: base.daily_charge(self.daily_rate, days_late),
            daily_rate: self.daily_rate,
            days_charged: days_late,
            base,
        }
    }
}
