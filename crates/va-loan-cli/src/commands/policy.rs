use serde_json::Value;

use va_loan_core::VaLoanPolicy;

/// Show the policy tables the calculators will use.
pub fn run_policy(policy: &VaLoanPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    policy.validate()?;
    Ok(serde_json::json!({ "result": policy }))
}

/// Load `--policy` overrides (JSON or YAML), falling back to the built-in policy.
pub fn load_policy(path: Option<&str>) -> Result<VaLoanPolicy, Box<dyn std::error::Error>> {
    let policy = match path {
        Some(path) => {
            let policy: VaLoanPolicy = crate::input::file::read_config(path)?;
            tracing::info!(version = %policy.version, path, "loaded policy overrides");
            policy
        }
        None => VaLoanPolicy::default(),
    };
    policy.validate()?;
    Ok(policy)
}
