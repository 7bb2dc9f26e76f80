//! Inputs taken from command-line flags

use anyhow::Result;
use snafu::OptionExt;
use tracing::debug;

use super::{AddBindingBackend, FLAG_BIND_AS_FILES, FLAG_NAME, FLAG_SERVICE, Flags, RemoveBindingBackend};
use crate::devfile::validate_k8s_resource_name;
use crate::error::{AmbiguousServiceSnafu, InvalidBoolSnafu, MissingFlagSnafu, ServiceNotFoundSnafu};

const SERVICE_HINT: &str = "please add --service <name>[/<kind>.<apigroup>] to specify the service instance for binding";
const ADD_NAME_HINT: &str = "please add --name <name> to specify a name for the service binding instance";
const REMOVE_NAME_HINT: &str = "please add --name <name> to specify the service binding to remove";

#[derive(Debug, Default, Clone)]
pub struct FlagsBackend;

impl FlagsBackend {
    pub fn new() -> Self {
        Self
    }
}

fn flag<'a>(flags: &'a Flags, key: &str) -> Option<&'a str> {
    flags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// Boolean syntax accepted by `--bind-as-files`
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Find the candidate designated by `--service`.
///
/// Candidates are labelled `<name> (<Kind>.<group>)`. A bare name must match
/// exactly one of them; `<name>/<Kind>.<group>` selects a single label.
fn match_service(service: &str, candidates: &[String]) -> Result<String> {
    let matches: Vec<&String> = match service.split_once('/') {
        Some((name, kind_group)) => {
            let label = format!("{name} ({kind_group})");
            candidates.iter().filter(|c| **c == label).collect()
        }
        None => {
            let prefix = format!("{service} (");
            candidates.iter().filter(|c| c.starts_with(&prefix)).collect()
        }
    };

    match matches.as_slice() {
        [] => Err(ServiceNotFoundSnafu { service }.build().into()),
        [single] => Ok((*single).clone()),
        several => Err(AmbiguousServiceSnafu {
            name: service,
            candidates: several.iter().map(|c| (*c).clone()).collect::<Vec<_>>(),
        }
        .build()
        .into()),
    }
}

impl AddBindingBackend for FlagsBackend {
    fn validate(&self, flags: &Flags) -> Result<()> {
        flag(flags, FLAG_SERVICE).context(MissingFlagSnafu {
            flag: FLAG_SERVICE,
            hint: SERVICE_HINT,
        })?;
        let name = flag(flags, FLAG_NAME).context(MissingFlagSnafu {
            flag: FLAG_NAME,
            hint: ADD_NAME_HINT,
        })?;
        validate_k8s_resource_name("binding name", name)
    }

    fn select_service_instance(&self, flags: &Flags, candidates: &[String]) -> Result<String> {
        let service = flag(flags, FLAG_SERVICE).context(MissingFlagSnafu {
            flag: FLAG_SERVICE,
            hint: SERVICE_HINT,
        })?;
        let selected = match_service(service, candidates)?;
        debug!("--service {service} selects {selected}");
        Ok(selected)
    }

    fn ask_binding_name(&self, _default_name: &str, flags: &Flags) -> Result<String> {
        let name = flag(flags, FLAG_NAME).context(MissingFlagSnafu {
            flag: FLAG_NAME,
            hint: ADD_NAME_HINT,
        })?;
        Ok(name.to_string())
    }

    fn ask_bind_as_files(&self, flags: &Flags) -> Result<bool> {
        let Some(value) = flag(flags, FLAG_BIND_AS_FILES) else {
            return Ok(true);
        };
        let parsed = parse_bool(value).context(InvalidBoolSnafu {
            flag: FLAG_BIND_AS_FILES,
            value,
        })?;
        Ok(parsed)
    }
}

impl RemoveBindingBackend for FlagsBackend {
    fn validate(&self, flags: &Flags) -> Result<()> {
        flag(flags, FLAG_NAME).context(MissingFlagSnafu {
            flag: FLAG_NAME,
            hint: REMOVE_NAME_HINT,
        })?;
        Ok(())
    }

    fn select_binding_name(&self, flags: &Flags, _candidates: &[String]) -> Result<String> {
        let name = flag(flags, FLAG_NAME).context(MissingFlagSnafu {
            flag: FLAG_NAME,
            hint: REMOVE_NAME_HINT,
        })?;
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;

    fn flags(pairs: &[(&str, &str)]) -> Flags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn candidates() -> Vec<String> {
        vec![
            "cluster-sample (Cluster.postgresql.k8s.enterprisedb.io)".to_string(),
            "redis (Redis.redis.redis.opstreelabs.in)".to_string(),
            "shared (Cluster.postgresql.k8s.enterprisedb.io)".to_string(),
            "shared (Redis.redis.redis.opstreelabs.in)".to_string(),
        ]
    }

    #[test]
    fn test_validate_requires_service() {
        let err = AddBindingBackend::validate(&FlagsBackend, &flags(&[("name", "mybinding")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing --service parameter: please add --service <name>[/<kind>.<apigroup>] to specify the service instance for binding"
        );
    }

    #[test]
    fn test_validate_requires_name() {
        let err = AddBindingBackend::validate(
            &FlagsBackend,
            &flags(&[("service", "cluster-sample"), ("name", "")]),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindingError>(),
            Some(BindingError::MissingFlag { flag: "name", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_invalid_name() {
        let too_long = "a".repeat(64);
        for bad in ["MyBinding", "-binding", "binding-", "1234", too_long.as_str()] {
            let result = AddBindingBackend::validate(
                &FlagsBackend,
                &flags(&[("service", "cluster-sample"), ("name", bad)]),
            );
            assert!(result.is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_accepts_valid_flags() {
        AddBindingBackend::validate(
            &FlagsBackend,
            &flags(&[("service", "cluster-sample"), ("name", "my-binding")]),
        )
        .unwrap();
    }

    #[test]
    fn test_select_service_by_name() {
        let selected = FlagsBackend
            .select_service_instance(&flags(&[("service", "redis")]), &candidates())
            .unwrap();
        assert_eq!(selected, "redis (Redis.redis.redis.opstreelabs.in)");
    }

    #[test]
    fn test_select_service_qualified() {
        let selected = FlagsBackend
            .select_service_instance(
                &flags(&[("service", "shared/Redis.redis.redis.opstreelabs.in")]),
                &candidates(),
            )
            .unwrap();
        assert_eq!(selected, "shared (Redis.redis.redis.opstreelabs.in)");
    }

    #[test]
    fn test_select_service_ambiguous() {
        let err = FlagsBackend
            .select_service_instance(&flags(&[("service", "shared")]), &candidates())
            .unwrap_err();
        match err.downcast_ref::<BindingError>() {
            Some(BindingError::AmbiguousService { candidates, .. }) => {
                assert_eq!(candidates.len(), 2)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_select_service_not_found() {
        let err = FlagsBackend
            .select_service_instance(&flags(&[("service", "mysql")]), &candidates())
            .unwrap_err();
        assert_eq!(err.to_string(), "\"mysql\" service not found");
    }

    #[test]
    fn test_bind_as_files() {
        let backend = FlagsBackend;
        assert!(backend.ask_bind_as_files(&flags(&[])).unwrap());
        assert!(backend.ask_bind_as_files(&flags(&[("bind-as-files", "True")])).unwrap());
        assert!(!backend.ask_bind_as_files(&flags(&[("bind-as-files", "0")])).unwrap());
        let err = backend
            .ask_bind_as_files(&flags(&[("bind-as-files", "yes")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to set \"yes\" to --bind-as-files, value must be a boolean"
        );
    }

    #[test]
    fn test_remove_requires_name() {
        assert!(RemoveBindingBackend::validate(&FlagsBackend, &flags(&[("service", "x")])).is_err());
        let name = FlagsBackend
            .select_binding_name(&flags(&[("name", "b1")]), &["b1".to_string()])
            .unwrap();
        assert_eq!(name, "b1");
    }
}
