use std::collections::HashSet;

use crate::error::Error;

/// Runtime configuration consumed by the core: who may decide, how many
/// approved applicants the beta admits, and where records live.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_ids: HashSet<i64>,
    pub max_beta: i64,
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let admin_ids = dotenv::var("BETAGATE_ADMIN_IDS")?
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::parse)
            .collect::<Result<HashSet<i64>, _>>()?;
        let max_beta = dotenv::var("BETAGATE_MAX_BETA")?.trim().parse()?;
        let data_dir = dotenv::var("BETAGATE_DATA_DIR")?;
        Ok(Self {
            admin_ids,
            max_beta,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_parses_admin_list() {
        std::env::set_var("BETAGATE_ADMIN_IDS", "100, 200,300");
        std::env::set_var("BETAGATE_MAX_BETA", "25");
        std::env::set_var("BETAGATE_DATA_DIR", "/tmp/betagate");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.admin_ids, HashSet::from([100, 200, 300]));
        assert_eq!(cfg.max_beta, 25);
        assert_eq!(cfg.data_dir, "/tmp/betagate");
    }
}
