use crate::error::Error;
use crate::host_store::{HostPatch, HostRecord};
use crate::interface_store::{InterfaceFamily, InterfaceSet};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct HostsResponse {
    pub hosts: Vec<HostRecord>,
}

#[derive(Serialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct InterfacesResponse {
    pub interfaces: InterfaceSet,
}

#[derive(Serialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every field of a new host is required, and must pass [`validate_host_name`] or
/// [`validate_host_value`].
pub(super) fn validate_new_host(host: &HostRecord) -> Result<(), Error> {
    let values = [
        ("hardware_ethernet", &host.hardware_ethernet),
        ("option_routers", &host.option_routers),
        ("option_subnet_mask", &host.option_subnet_mask),
        ("fixed_address", &host.fixed_address),
        ("option_domain_name_servers", &host.option_domain_name_servers),
    ];
    let blank = std::iter::once(("name", &host.name))
        .chain(values)
        .find(|(_, value)| value.trim().is_empty());
    if let Some((field, _)) = blank {
        return Err(Error::InvalidRequest(format!("{field} is required")));
    }
    validate_host_name(&host.name)?;
    for (field, value) in values {
        validate_host_value(field, value)?;
    }
    Ok(())
}

/// Checks the fields a patch sets. Empty values are allowed and an empty name is ignored.
pub(super) fn validate_host_patch(patch: &HostPatch) -> Result<(), Error> {
    if let Some(name) = patch.name.as_deref().filter(|name| !name.is_empty()) {
        validate_host_name(name)?;
    }
    let values = [
        ("hardware_ethernet", &patch.hardware_ethernet),
        ("option_routers", &patch.option_routers),
        ("option_subnet_mask", &patch.option_subnet_mask),
        ("fixed_address", &patch.fixed_address),
        ("option_domain_name_servers", &patch.option_domain_name_servers),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            validate_host_value(field, value)?;
        }
    }
    Ok(())
}

/// A host name is written as `host NAME {`, so it must be one token that can't open, close or
/// end a statement.
fn validate_host_name(name: &str) -> Result<(), Error> {
    if name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "{};#".contains(c))
    {
        return Err(Error::InvalidRequest(format!("invalid name: {name:?}")));
    }
    Ok(())
}

/// A value is written as `LABEL VALUE;` and read back trimmed up to the first `;`, so it can't
/// carry statement syntax, line breaks or surrounding whitespace.
fn validate_host_value(field: &str, value: &str) -> Result<(), Error> {
    if value.trim() != value || value.chars().any(|c| c.is_control() || "{};#".contains(c)) {
        return Err(Error::InvalidRequest(format!("invalid {field}: {value:?}")));
    }
    Ok(())
}

#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct InterfaceOperation {
    #[serde(rename = "type")]
    pub family: String,
    pub interface: String,
}

impl InterfaceOperation {
    /// The requested family. The interface name must be a single non-empty token so it can't
    /// split or unquote the assignment it is written into.
    pub fn validate(&self) -> Result<InterfaceFamily, Error> {
        let family = self.family.parse()?;
        if self.interface.is_empty() {
            return Err(Error::InvalidRequest("interface is required".to_string()));
        }
        if self
            .interface
            .chars()
            .any(|c| c.is_whitespace() || c == '"')
        {
            return Err(Error::InvalidRequest(format!(
                "invalid interface name: {:?}",
                self.interface
            )));
        }
        Ok(family)
    }
}

#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct TokenUpdateRequest {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(family: &str, interface: &str) -> InterfaceOperation {
        InterfaceOperation {
            family: family.to_string(),
            interface: interface.to_string(),
        }
    }

    #[test]
    fn interface_operation_validation() {
        assert_eq!(operation("V6", "eth0").validate().unwrap(), InterfaceFamily::V6);
        assert!(matches!(
            operation("v7", "eth0").validate(),
            Err(Error::InvalidInterfaceType(_))
        ));
        assert!(matches!(
            operation("v4", "").validate(),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            operation("v4", "eth0 eth1").validate(),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            operation("v4", "eth0\"").validate(),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn new_host_requires_every_field() {
        let mut host = HostRecord {
            name: "a".to_string(),
            hardware_ethernet: "00:11:22:33:44:55".to_string(),
            option_routers: "10.0.0.1".to_string(),
            option_subnet_mask: "255.255.255.0".to_string(),
            fixed_address: "10.0.0.5".to_string(),
            option_domain_name_servers: "8.8.8.8".to_string(),
        };
        assert!(validate_new_host(&host).is_ok());

        host.fixed_address = " ".to_string();
        let err = validate_new_host(&host).unwrap_err();
        assert_eq!(err.to_string(), "invalid request payload: fixed_address is required");

        host.fixed_address = "10.0.0.5; }\nhost rogue { fixed-address 10.0.0.66;".to_string();
        assert!(matches!(
            validate_new_host(&host),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn host_names_must_be_a_single_token() {
        for name in ["my printer", "a{", "a}", "a;", "a\nb", "#a"] {
            assert!(
                validate_host_name(name).is_err(),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_host_name("printer-2.lan").is_ok());
    }

    #[test]
    fn host_values_must_read_back_unchanged() {
        let rejected = [
            " 10.0.0.5",
            "10.0.0.5 ",
            "10.0.0.5;",
            "a{",
            "a}",
            "a\nb",
            "a\rb",
            "a#b",
        ];
        for value in rejected {
            assert!(
                validate_host_value("fixed_address", value).is_err(),
                "{value:?} should be rejected"
            );
        }
        assert!(validate_host_value("option_domain_name_servers", "8.8.8.8, 1.1.1.1").is_ok());
        assert!(validate_host_value("fixed_address", "").is_ok());
    }

    #[test]
    fn patch_checks_only_the_fields_it_sets() {
        let rename = HostPatch {
            name: Some("my printer".to_string()),
            ..HostPatch::default()
        };
        assert!(matches!(
            validate_host_patch(&rename),
            Err(Error::InvalidRequest(_))
        ));

        let clear = HostPatch {
            name: Some(String::new()),
            fixed_address: Some(String::new()),
            option_routers: Some("10.0.0.254".to_string()),
            ..HostPatch::default()
        };
        assert!(validate_host_patch(&clear).is_ok());

        let inject = HostPatch {
            option_routers: Some("10.0.0.1;\n}".to_string()),
            ..HostPatch::default()
        };
        assert!(validate_host_patch(&inject).is_err());
    }
}
