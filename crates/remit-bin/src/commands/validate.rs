// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use remit_config::RemitConfig;
use remit_config::schema::DEFAULT_BCRYPT_COST;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = remit_config::load_config(config_path)
        .map_err(|e| BinError::config(format!("Configuration validation failed: {}", e)))?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Payments portal: {}", portal_line(config.payments.enabled, config.payments_addr()));
            println!("  Employee portal: {}", portal_line(config.employee.enabled, config.employee_addr()));
            println!("  Token lifetime:  {}s", config.security.jwt.expiration_secs);
            println!("  bcrypt cost:     {}", config.security.password.bcrypt_cost);
            println!("  CSRF:            {}", enabled(config.security.csrf.enabled));
            println!("  Login limit:     {}", enabled(config.security.login_rate_limit.enabled));
            println!("  Audit:           {}", enabled(config.security.audit.enabled));
            println!("  Seed employees:  {}", config.seed.employees.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                match serde_json::to_string_pretty(&config) {
                    Ok(json) => println!("{}", json),
                    Err(e) => println!("(serialization error: {})", e),
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "payments_enabled": config.payments.enabled,
                    "payments_addr": config.payments_addr().to_string(),
                    "employee_enabled": config.employee.enabled,
                    "employee_addr": config.employee_addr().to_string(),
                    "bcrypt_cost": config.security.password.bcrypt_cost,
                    "seed_employees": config.seed.employees.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("Failed to render output: {}", e)))?;
            println!("{}", rendered);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns deployment warnings for a configuration that passed validation.
pub fn collect_warnings(config: &RemitConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.security.password.bcrypt_cost < DEFAULT_BCRYPT_COST {
        warnings.push(format!(
            "bcrypt cost {} is below the recommended {}",
            config.security.password.bcrypt_cost, DEFAULT_BCRYPT_COST
        ));
    }

    let csrf = &config.security.csrf;
    if !csrf.enabled {
        warnings.push("CSRF protection is disabled".to_string());
    } else if !csrf.secure_cookie {
        warnings.push("CSRF cookie is sent without the Secure attribute".to_string());
    }

    if !config.security.login_rate_limit.enabled {
        warnings.push("Login rate limiting is disabled".to_string());
    }

    if config.employee.enabled && config.seed.employees.is_empty() {
        warnings.push("Employee portal is enabled but no employees are seeded".to_string());
    }

    for (name, portal) in [("payments", &config.payments), ("employee", &config.employee)] {
        if portal.enabled && portal.allows_any_origin() {
            warnings.push(format!(
                "{} portal allows any CORS origin; credentials are disabled",
                name
            ));
        }
    }

    warnings
}

fn portal_line(is_enabled: bool, addr: std::net::SocketAddr) -> String {
    if is_enabled {
        addr.to_string()
    } else {
        "disabled".to_string()
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_config::SeedEmployee;

    fn hardened() -> RemitConfig {
        let mut config = RemitConfig::default();
        config.security.csrf.secure_cookie = true;
        config.seed.employees.push(SeedEmployee {
            employee_id: "EMP12345".to_string(),
            full_name: "Thandi Nkosi".to_string(),
            password_hash: Some("$2b$12$abcdefghijklmnopqrstuv".to_string()),
            password: None,
        });
        config
    }

    #[test]
    fn test_no_warnings_for_hardened_config() {
        assert!(collect_warnings(&hardened()).is_empty());
    }

    #[test]
    fn test_warnings() {
        let mut config = hardened();
        config.security.password.bcrypt_cost = 10;
        config.security.csrf.secure_cookie = false;
        config.seed.employees.clear();
        config.payments.allowed_origins = vec!["*".to_string()];

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("bcrypt cost 10"));
        assert!(warnings.iter().any(|w| w.contains("Secure")));
        assert!(warnings.iter().any(|w| w.contains("no employees")));
        assert!(warnings.iter().any(|w| w.starts_with("payments portal")));
    }
}
