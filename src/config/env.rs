use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use anyhow::anyhow;

pub fn get_env_mandatory_value<T, E>(key: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = E>,
    E: Error + Send + Sync + 'static
{
    std::env::var(key)
        .map_err(|e| anyhow!("{key} environment variable must be set: {e}"))?
        .parse()
        .map_err(|e: E| anyhow!("invalid value of the {key} environment variable: {e}"))
}

pub fn get_env_value_or_default<T, E>(key: &str, default: T) -> T
where
    T: FromStr<Err = E> + Display,
    E: Error + Send + Sync + 'static
{
    std::env::var(key)
        .map_err(|e| {
            log::warn!("no value was found for an optional environment variable {key}, using the default value {default}");
            anyhow!(e)
        })
        .and_then(|v| v.parse()
            .map_err(|e: E| {
                log::warn!("invalid value of the {key} environment variable, using the default value {default}");
                anyhow!(e)
            }))
        .unwrap_or(default)
}

pub(super) fn get_optional_env_value<T>(key: &str) -> T
where
    T: Default + FromStr + Display,
    <T as FromStr>::Err: Error + Send + Sync + 'static
{
    get_env_value_or_default(key, T::default())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_env_value_or_default() {
        std::env::set_var("FGB_TEST_INTERVAL", "15");
        std::env::set_var("FGB_TEST_BROKEN", "fifteen");
        assert_eq!(get_env_value_or_default("FGB_TEST_INTERVAL", 720u64), 15);
        assert_eq!(get_env_value_or_default("FGB_TEST_BROKEN", 720u64), 720);
        assert_eq!(get_env_value_or_default("FGB_TEST_MISSING", 720u64), 720);
        assert!(!get_optional_env_value::<bool>("FGB_TEST_MISSING"));
    }

    #[test]
    fn test_get_env_mandatory_value() {
        std::env::set_var("FGB_TEST_OWNER", "42");
        assert_eq!(get_env_mandatory_value::<u64, _>("FGB_TEST_OWNER").unwrap(), 42);
        assert!(get_env_mandatory_value::<u64, _>("FGB_TEST_OWNER_MISSING").is_err());
    }
}
