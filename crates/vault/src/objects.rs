//! Object descriptor parsing and correlation.
//!
//! The host hands the adapter four parallel `;`-separated lists (names,
//! types, versions, aliases). Correlation is a positional zip into
//! [`ObjectDescriptor`]s, validated before any network access: a mismatch
//! anywhere fails the whole batch. The one tolerated irregularity is a
//! short or missing version list, which pads with "latest".

use std::fmt;
use std::str::FromStr;

use crate::error::DescriptorError;

/// List separator used by the host.
pub const OBJECTS_SEPARATOR: char = ';';

/// Kind of vault object to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// UTF-8 secret value
    Secret,
    /// RSA key; only the public modulus is retrievable
    Key,
    /// DER-encoded certificate
    Certificate,
}

impl ObjectKind {
    /// Canonical spelling, matching the host's type vocabulary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::Key => "key",
            Self::Certificate => "cert",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secret" => Ok(Self::Secret),
            "key" => Ok(Self::Key),
            "cert" | "certificate" => Ok(Self::Certificate),
            other => Err(DescriptorError::UnknownKind {
                value: other.to_string(),
            }),
        }
    }
}

/// One object to fetch and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// What to fetch
    pub kind: ObjectKind,
    /// Object name in the vault
    pub name: String,
    /// Specific version; `None` means latest
    pub version: Option<String>,
    /// Output filename override; `None` falls back to the object name
    pub alias: Option<String>,
}

impl ObjectDescriptor {
    /// Filename the object's content is written under.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Requested version for diagnostics, `"latest"` when unpinned.
    #[must_use]
    pub fn version_label(&self) -> &str {
        self.version.as_deref().unwrap_or("latest")
    }
}

/// Correlate the four parallel descriptor lists into fetch requests.
///
/// Validation order: names non-empty, then name/type cardinality, then
/// alias cardinality (when aliases are given at all), then every type
/// token. Order of the output matches the input lists.
pub fn parse_descriptors(
    names: &str,
    types: &str,
    versions: &str,
    aliases: &str,
) -> Result<Vec<ObjectDescriptor>, DescriptorError> {
    let names = split_list(names);
    if names.is_empty() {
        return Err(DescriptorError::EmptyNames);
    }

    let types = split_list(types);
    if types.len() != names.len() {
        return Err(DescriptorError::CountMismatch {
            names: names.len(),
            types: types.len(),
        });
    }

    let aliases = split_list(aliases);
    if !aliases.is_empty() && aliases.len() != names.len() {
        return Err(DescriptorError::AliasCountMismatch {
            aliases: aliases.len(),
            names: names.len(),
        });
    }

    // Versions are optional; a short list pads with latest.
    let versions = split_list(versions);

    let mut descriptors = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let kind = types[index].parse::<ObjectKind>()?;
        let version = versions
            .get(index)
            .filter(|version| !version.is_empty())
            .map(|version| (*version).to_string());
        let alias = aliases.get(index).map(|alias| (*alias).to_string());
        descriptors.push(ObjectDescriptor {
            kind,
            name: (*name).to_string(),
            version,
            alias,
        });
    }
    Ok(descriptors)
}

fn split_list(list: &str) -> Vec<&str> {
    if list.is_empty() {
        return Vec::new();
    }
    list.split(OBJECTS_SEPARATOR).collect()
}
