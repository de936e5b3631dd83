use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{LendError, Result};

/// how daily late interest relates to the overdue-periods formula on lump-sum loans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LateInterestPolicy {
    /// overdue periods only, no daily interest on lump-sum loans
    #[default]
    PeriodsOnly,
    /// principal * daily late rate * days overdue added on top of the periods formula
    Stacked,
}

/// accrual engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualConfig {
    /// days counted as one billing period when a lump-sum loan runs past due
    pub period_days: u32,
    pub late_interest_policy: LateInterestPolicy,
    /// window used by the dashboard for "due soon" loans
    pub due_soon_days: u32,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            period_days: 30,
            late_interest_policy: LateInterestPolicy::PeriodsOnly,
            due_soon_days: 7,
        }
    }
}

impl AccrualConfig {
    pub fn with_late_interest_policy(mut self, policy: LateInterestPolicy) -> Self {
        self.late_interest_policy = policy;
        self
    }

    pub fn with_period_days(mut self, days: u32) -> Self {
        self.period_days = days;
        self
    }

    pub fn with_due_soon_days(mut self, days: u32) -> Self {
        self.due_soon_days = days;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_days == 0 {
            return Err(LendError::InvalidConfiguration {
                message: "period_days must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// parse from json, validating the result
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AccrualConfig = serde_json::from_str(json).map_err(|e| {
            LendError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// how long a cached value stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessPolicy {
    pub ttl_seconds: i64,
}

impl FreshnessPolicy {
    pub fn from_seconds(ttl_seconds: i64) -> Self {
        Self { ttl_seconds }
    }

    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self { ttl_seconds: 30 }
    }
}

/// system branding shown by the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingConfig {
    pub system_name: String,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            system_name: "Flow Lend".to_string(),
            logo_url: None,
            favicon_url: None,
            primary_color: "#3b82f6".to_string(),
            secondary_color: "#64748b".to_string(),
        }
    }
}

impl BrandingConfig {
    /// merge a partial update over this config, keeping current values for unset fields
    pub fn merged(&self, update: BrandingUpdate) -> Self {
        Self {
            system_name: update
                .system_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.system_name.clone()),
            logo_url: update.logo_url.unwrap_or_else(|| self.logo_url.clone()),
            favicon_url: update.favicon_url.unwrap_or_else(|| self.favicon_url.clone()),
            primary_color: update
                .primary_color
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.primary_color.clone()),
            secondary_color: update
                .secondary_color
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.secondary_color.clone()),
        }
    }
}

/// partial branding update; `Some(None)` clears an optional url
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingUpdate {
    pub system_name: Option<String>,
    pub logo_url: Option<Option<String>>,
    pub favicon_url: Option<Option<String>>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
}
