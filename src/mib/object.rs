//! MIB object metadata carried by tree nodes.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;

use crate::error::{Error, Result};

/// MAX-ACCESS / ACCESS clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Access {
    #[default]
    NotAccessible,
    ReadOnly,
    ReadWrite,
    WriteOnly,
}

/// STATUS clause (SMIv1 spellings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Status {
    #[default]
    Mandatory,
    Optional,
    Obsolete,
    Deprecated,
}

/// Lower-case and treat `_` like `-`, so `READ_ONLY` reads as `read-only`.
fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}

impl FromStr for Access {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "not-accessible" => Ok(Self::NotAccessible),
            "read-only" => Ok(Self::ReadOnly),
            "read-write" => Ok(Self::ReadWrite),
            "write-only" => Ok(Self::WriteOnly),
            _ => Err(Error::bad_value(format!("Access: unknown access '{}'", s))),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotAccessible => "not-accessible",
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
            Self::WriteOnly => "write-only",
        })
    }
}

impl FromStr for Status {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "mandatory" => Ok(Self::Mandatory),
            "optional" => Ok(Self::Optional),
            "obsolete" => Ok(Self::Obsolete),
            "deprecated" => Ok(Self::Deprecated),
            _ => Err(Error::bad_value(format!("Status: unknown status '{}'", s))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mandatory => "mandatory",
            Self::Optional => "optional",
            Self::Obsolete => "obsolete",
            Self::Deprecated => "deprecated",
        })
    }
}

/// One named number of an enumerated INTEGER, e.g. `up(1)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueLabel {
    pub value: i64,
    pub label: String,
}

/// SYNTAX clause: the type name and, for enumerations, the value table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MibSyntax {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub values: Vec<ValueLabel>,
}

impl MibSyntax {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            values: Vec::new(),
        }
    }

    /// Add an enumeration entry.
    pub fn value(mut self, value: i64, label: impl Into<String>) -> Self {
        self.values.push(ValueLabel {
            value,
            label: label.into(),
        });
        self
    }

    /// Whether this syntax carries a value table.
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Label for `value`, if the table has one.
    ///
    /// An empty label counts as no label.
    ///
    /// ```
    /// use mibwalk::mib::MibSyntax;
    /// use num_bigint::BigInt;
    ///
    /// let status = MibSyntax::new("INTEGER").value(1, "up").value(2, "down");
    /// assert_eq!(status.label_for(&BigInt::from(2)), Some("down"));
    /// assert_eq!(status.label_for(&BigInt::from(3)), None);
    /// ```
    pub fn label_for(&self, value: &BigInt) -> Option<&str> {
        let value = i64::try_from(value).ok()?;
        self.values
            .iter()
            .find(|v| v.value == value && !v.label.is_empty())
            .map(|v| v.label.as_str())
    }
}

/// Metadata of one OID tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MibObject {
    pub name: String,
    /// Subidentifier, unique among siblings.
    #[cfg_attr(feature = "serde", serde(rename = "id"))]
    pub subid: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub access: Access,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Status,
    #[cfg_attr(feature = "serde", serde(default))]
    pub syntax: MibSyntax,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Name of the MIB module that defined the object.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mib: String,
}

impl MibObject {
    pub fn new(name: impl Into<String>, subid: u32) -> Self {
        Self {
            name: name.into(),
            subid,
            access: Access::default(),
            status: Status::default(),
            syntax: MibSyntax::default(),
            description: String::new(),
            mib: String::new(),
        }
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn syntax(mut self, syntax: MibSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn mib(mut self, mib: impl Into<String>) -> Self {
        self.mib = mib.into();
        self
    }
}

impl fmt::Display for MibObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A flat definition as produced by a MIB compiler: an object plus the name
/// of its parent. `parent: None` places the object at the top of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MibObjectDef {
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub object: MibObject,
}

impl MibObjectDef {
    /// Top-level definition (a child of the synthetic root).
    pub fn top_level(object: MibObject) -> Self {
        Self {
            parent: None,
            object,
        }
    }

    /// Definition placed under the node named `parent`.
    pub fn under(parent: impl Into<String>, object: MibObject) -> Self {
        Self {
            parent: Some(parent.into()),
            object,
        }
    }
}
