use crate::workflows::insurance::EligibilityConfig;
use crate::workflows::payroll::{DeductionConfig, Rate};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityConfig,
    pub deductions: DeductionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            eligibility: load_eligibility()?,
            deductions: load_deductions()?,
        })
    }
}

fn load_eligibility() -> Result<EligibilityConfig, ConfigError> {
    let defaults = EligibilityConfig::default();
    Ok(EligibilityConfig {
        pension_max_age: number("ELIGIBILITY_PENSION_MAX_AGE", defaults.pension_max_age)?,
        pension_min_monthly_wage: number(
            "ELIGIBILITY_PENSION_MIN_MONTHLY_WAGE",
            defaults.pension_min_monthly_wage,
        )?,
        pension_min_work_days: number(
            "ELIGIBILITY_PENSION_MIN_WORK_DAYS",
            defaults.pension_min_work_days,
        )?,
        pension_min_work_hours: hours(
            "ELIGIBILITY_PENSION_MIN_WORK_HOURS",
            defaults.pension_min_work_hours,
        )?,
        health_min_work_hours: hours(
            "ELIGIBILITY_HEALTH_MIN_WORK_HOURS",
            defaults.health_min_work_hours,
        )?,
        employment_min_work_hours: hours(
            "ELIGIBILITY_EMPLOYMENT_MIN_WORK_HOURS",
            defaults.employment_min_work_hours,
        )?,
    })
}

fn load_deductions() -> Result<DeductionConfig, ConfigError> {
    let defaults = DeductionConfig::default();
    Ok(DeductionConfig {
        daily_income_exemption: number(
            "PAYROLL_DAILY_INCOME_EXEMPTION",
            defaults.daily_income_exemption,
        )?,
        income_tax_rate: rate("PAYROLL_INCOME_TAX_RATE", defaults.income_tax_rate)?,
        income_tax_credit_rate: rate(
            "PAYROLL_INCOME_TAX_CREDIT_RATE",
            defaults.income_tax_credit_rate,
        )?,
        minimum_withholding: number(
            "PAYROLL_MINIMUM_WITHHOLDING",
            defaults.minimum_withholding,
        )?,
        local_tax_rate: rate("PAYROLL_LOCAL_TAX_RATE", defaults.local_tax_rate)?,
        employment_insurance_rate: rate(
            "PAYROLL_EMPLOYMENT_INSURANCE_RATE",
            defaults.employment_insurance_rate,
        )?,
        national_pension_rate: rate(
            "PAYROLL_NATIONAL_PENSION_RATE",
            defaults.national_pension_rate,
        )?,
        pension_income_floor: number(
            "PAYROLL_PENSION_INCOME_FLOOR",
            defaults.pension_income_floor,
        )?,
        pension_income_ceiling: number(
            "PAYROLL_PENSION_INCOME_CEILING",
            defaults.pension_income_ceiling,
        )?,
        health_insurance_rate: rate(
            "PAYROLL_HEALTH_INSURANCE_RATE",
            defaults.health_insurance_rate,
        )?,
        long_term_care_rate: rate("PAYROLL_LONG_TERM_CARE_RATE", defaults.long_term_care_rate)?,
        truncation_unit: number("PAYROLL_TRUNCATION_UNIT", defaults.truncation_unit)?,
    })
}

fn number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn hours(key: &'static str, default: f32) -> Result<f32, ConfigError> {
    let value: f32 = number(key, default)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidNumber { key });
    }
    Ok(value)
}

/// Rates are configured as percentages, e.g. `0.9` or `3.545`.
fn rate(key: &'static str, default: Rate) -> Result<Rate, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    let percent: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { key })?;
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ConfigError::InvalidNumber { key });
    }
    Ok(Rate::per_100k((percent * 1_000.0).round() as u32))
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{} must be a non-negative number", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ELIGIBILITY_PENSION_MAX_AGE",
            "ELIGIBILITY_PENSION_MIN_WORK_DAYS",
            "ELIGIBILITY_HEALTH_MIN_WORK_HOURS",
            "PAYROLL_EMPLOYMENT_INSURANCE_RATE",
            "PAYROLL_TRUNCATION_UNIT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.eligibility, EligibilityConfig::default());
        assert_eq!(config.deductions, DeductionConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_threshold_and_rate_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ELIGIBILITY_PENSION_MAX_AGE", "65");
        env::set_var("PAYROLL_EMPLOYMENT_INSURANCE_RATE", "1.15%");
        env::set_var("PAYROLL_TRUNCATION_UNIT", "1");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.eligibility.pension_max_age, 65);
        assert_eq!(config.deductions.employment_insurance_rate.parts(), 1_150);
        assert_eq!(config.deductions.truncation_unit, 1);
        reset_env();
    }

    #[test]
    fn rejects_malformed_numbers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ELIGIBILITY_PENSION_MIN_WORK_DAYS", "eight");
        let error = AppConfig::load().expect_err("invalid number");
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                key: "ELIGIBILITY_PENSION_MIN_WORK_DAYS"
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_negative_or_non_finite_hour_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        for raw in ["NaN", "-5", "inf"] {
            reset_env();
            env::set_var("ELIGIBILITY_HEALTH_MIN_WORK_HOURS", raw);
            let error = AppConfig::load().expect_err("hour threshold rejected");
            assert!(matches!(
                error,
                ConfigError::InvalidNumber {
                    key: "ELIGIBILITY_HEALTH_MIN_WORK_HOURS"
                }
            ));
        }

        reset_env();
        env::set_var("ELIGIBILITY_HEALTH_MIN_WORK_HOURS", "52.5");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.eligibility.health_min_work_hours, 52.5);
        reset_env();
    }
}
