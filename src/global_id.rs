//! Relay global object identifiers: `base64("<Type>:<id>")`

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

pub fn to_global_id(type_name: &str, id: &str) -> String {
    BASE64.encode(format!("{}:{}", type_name, id))
}

/// Split a global id into its type name and local id. The id may itself
/// contain `:`.
pub fn from_global_id(global_id: &str) -> Result<(String, String)> {
    let bytes = BASE64
        .decode(global_id)
        .context("Global id is not valid base64")?;
    let decoded = String::from_utf8(bytes).context("Global id is not valid UTF-8")?;
    let Some((type_name, id)) = decoded.split_once(':') else {
        bail!("Global id {:?} has no type separator", global_id);
    };
    if type_name.is_empty() {
        bail!("Global id {:?} has an empty type name", global_id);
    }
    Ok((type_name.to_string(), id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_global_id() {
        assert_eq!(to_global_id("User", "1"), "VXNlcjox");
    }

    #[test]
    fn test_from_global_id_keeps_colons_in_id() {
        let (type_name, id) = from_global_id("VGFzazphOmI=").unwrap();
        assert_eq!(type_name, "Task");
        assert_eq!(id, "a:b");
    }

    #[test]
    fn test_from_global_id_rejects_garbage() {
        assert!(from_global_id("not base64!").is_err());
        assert!(from_global_id(&BASE64.encode("nocolon")).is_err());
        assert!(from_global_id(&BASE64.encode(":1")).is_err());
    }
}
