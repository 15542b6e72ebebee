//! Type-safe resource identifiers.
//!
//! Databases and tables are addressed by hierarchical names such as
//! `databases/PetMetricsDB/tables/PetMetricsTable`. The [`resource_type!`]
//! macro generates one name type per resource so that a table name can never
//! be passed where a database name is expected.

use snafu::Snafu;

const MIN_ID_LEN: usize = 3;
const MAX_ID_LEN: usize = 256;

/// Errors that can occur when parsing resource names.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum ResourceError {
    #[snafu(display("invalid resource name format: expected '{expected}' but got '{actual}'"))]
    InvalidFormat { expected: String, actual: String },
    #[snafu(display("missing parent resource in name: '{name}'"))]
    MissingParent { name: String },
    #[snafu(display(
        "invalid resource id: '{id}' - must be 3 to 256 characters of letters, digits, '_', '.' and '-'"
    ))]
    InvalidResourceId { id: String },
}

pub type ResourceResult<T, E = ResourceError> = ::std::result::Result<T, E>;

/// Validate a database or table id.
///
/// Valid ids are 3 to 256 characters long and contain only ASCII letters,
/// digits, underscores, dots and hyphens.
pub fn validate_resource_id(id: &str) -> ResourceResult<()> {
    let valid_len = (MIN_ID_LEN..=MAX_ID_LEN).contains(&id.len());
    let valid_chars = id
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '-');

    if !valid_len || !valid_chars {
        return Err(ResourceError::InvalidResourceId { id: id.to_string() });
    }

    Ok(())
}

/// Generates a `<Name>Name` identifier type.
///
/// The two-argument form creates a root resource (`{prefix}/{id}`), the
/// three-argument form a child of another generated resource
/// (`{parent}/{prefix}/{id}`).
#[macro_export]
macro_rules! resource_type {
    ($name:ident, $prefix:literal) => {
        paste::paste! {
            #[doc = "Type-safe identifier for a " $name " resource."]
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct [<$name Name>] {
                /// The resource ID.
                pub id: String,
            }

            impl [<$name Name>] {
                #[doc = "Create a new " $name " resource identifier."]
                pub fn new(id: impl Into<String>) -> $crate::name::ResourceResult<Self> {
                    let id = id.into();
                    $crate::name::validate_resource_id(&id)?;
                    Ok(Self { id })
                }

                #[doc = "Create a new " $name " resource identifier without validation."]
                #[doc = ""]
                #[doc = "# Panics"]
                #[doc = ""]
                #[doc = "Panics if the resource ID is invalid."]
                pub fn new_unchecked(id: impl Into<String>) -> Self {
                    let id = id.into();
                    $crate::name::validate_resource_id(&id)
                        .expect("resource id must be valid");
                    Self { id }
                }

                #[doc = "Get the full resource name."]
                pub fn name(&self) -> String {
                    format!("{}/{}", $prefix, self.id)
                }

                #[doc = "Parse a resource name into a " $name " identifier."]
                pub fn parse(name: &str) -> $crate::name::ResourceResult<Self> {
                    let Some(id) = name.strip_prefix(concat!($prefix, "/")) else {
                        return Err($crate::name::ResourceError::InvalidFormat {
                            expected: format!("{}/{{id}}", $prefix),
                            actual: name.to_string(),
                        });
                    };

                    Self::new(id)
                }

                #[doc = "Get the resource ID."]
                pub fn id(&self) -> &str {
                    &self.id
                }
            }

            impl std::fmt::Display for [<$name Name>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.name())
                }
            }

            impl std::str::FromStr for [<$name Name>] {
                type Err = $crate::name::ResourceError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::parse(s)
                }
            }
        }
    };

    ($name:ident, $prefix:literal, $parent:ident) => {
        paste::paste! {
            #[doc = "Type-safe identifier for a " $name " resource."]
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct [<$name Name>] {
                /// The parent resource.
                pub parent: [<$parent Name>],
                /// The resource ID.
                pub id: String,
            }

            impl [<$name Name>] {
                #[doc = "Create a new " $name " resource identifier."]
                pub fn new(
                    id: impl Into<String>,
                    parent: [<$parent Name>],
                ) -> $crate::name::ResourceResult<Self> {
                    let id = id.into();
                    $crate::name::validate_resource_id(&id)?;
                    Ok(Self { parent, id })
                }

                #[doc = "Create a new " $name " resource identifier without validation."]
                #[doc = ""]
                #[doc = "# Panics"]
                #[doc = ""]
                #[doc = "Panics if the resource ID is invalid."]
                pub fn new_unchecked(id: impl Into<String>, parent: [<$parent Name>]) -> Self {
                    let id = id.into();
                    $crate::name::validate_resource_id(&id)
                        .expect("resource id must be valid");
                    Self { parent, id }
                }

                #[doc = "Get the full resource name."]
                pub fn name(&self) -> String {
                    format!("{}/{}/{}", self.parent.name(), $prefix, self.id)
                }

                #[doc = "Parse a resource name into a " $name " identifier."]
                pub fn parse(name: &str) -> $crate::name::ResourceResult<Self> {
                    let separator = concat!("/", $prefix, "/");
                    let Some((parent, id)) = name.rsplit_once(separator) else {
                        return Err($crate::name::ResourceError::InvalidFormat {
                            expected: format!("{{parent}}/{}/{{id}}", $prefix),
                            actual: name.to_string(),
                        });
                    };

                    let parent = [<$parent Name>]::parse(parent).map_err(|_| {
                        $crate::name::ResourceError::MissingParent {
                            name: name.to_string(),
                        }
                    })?;

                    Self::new(id, parent)
                }

                #[doc = "Get the resource ID."]
                pub fn id(&self) -> &str {
                    &self.id
                }

                #[doc = "Get the parent resource."]
                pub fn parent(&self) -> &[<$parent Name>] {
                    &self.parent
                }
            }

            impl std::fmt::Display for [<$name Name>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.name())
                }
            }

            impl std::str::FromStr for [<$name Name>] {
                type Err = $crate::name::ResourceError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::parse(s)
                }
            }
        }
    };
}
