// Field descriptors and role bindings.
//
// Descriptors arrive either as bare column names or as objects; both are
// normalized into `FieldDescriptor` at deserialization time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value types a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Date,
    Boolean,
    #[serde(other)]
    Other,
}

/// Identifies a dataset column bound to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_types: Option<Vec<ValueType>>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            allowed_types: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for series and legends, falling back to the column name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

impl From<&str> for FieldDescriptor {
    fn from(name: &str) -> Self {
        FieldDescriptor::new(name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Name(String),
    Descriptor {
        name: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default, rename = "allowedTypes")]
        allowed_types: Option<Vec<ValueType>>,
    },
}

impl From<RawField> for FieldDescriptor {
    fn from(raw: RawField) -> Self {
        match raw {
            RawField::Name(name) => FieldDescriptor::new(name.trim()),
            RawField::Descriptor {
                name,
                label,
                allowed_types,
            } => FieldDescriptor {
                name: name.trim().to_string(),
                label,
                allowed_types,
            },
        }
    }
}

/// Chart roles a column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    X,
    Y,
    Y2,
    Color,
    Label,
    Labels,
    Category,
    Indicators,
    Value,
    Size,
    Group,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::X => "x",
            Role::Y => "y",
            Role::Y2 => "y2",
            Role::Color => "color",
            Role::Label => "label",
            Role::Labels => "labels",
            Role::Category => "category",
            Role::Indicators => "indicators",
            Role::Value => "value",
            Role::Size => "size",
            Role::Group => "group",
        }
    }
}

/// Role name -> ordered descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBinding", into = "IndexMap<String, Vec<FieldDescriptor>>")]
pub struct FieldBinding {
    roles: IndexMap<String, Vec<FieldDescriptor>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRole {
    Many(Vec<Option<FieldDescriptor>>),
    One(FieldDescriptor),
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawBinding(IndexMap<String, Option<RawRole>>);

impl From<RawBinding> for FieldBinding {
    fn from(raw: RawBinding) -> Self {
        let mut binding = FieldBinding::new();
        for (role, fields) in raw.0 {
            let fields = match fields {
                None => Vec::new(),
                Some(RawRole::One(field)) => vec![field],
                Some(RawRole::Many(fields)) => fields.into_iter().flatten().collect(),
            };
            binding.set(&role, fields);
        }
        binding
    }
}

impl From<FieldBinding> for IndexMap<String, Vec<FieldDescriptor>> {
    fn from(binding: FieldBinding) -> Self {
        binding.roles
    }
}

impl FieldBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding of plain column names to a role.
    pub fn bind(mut self, role: Role, names: &[&str]) -> Self {
        self.set(role.as_str(), names.iter().map(|n| FieldDescriptor::from(*n)).collect());
        self
    }

    pub fn with_fields(mut self, role: Role, fields: Vec<FieldDescriptor>) -> Self {
        self.set(role.as_str(), fields);
        self
    }

    /// Replace a role's descriptors. Blank names are dropped; a role left
    /// with nothing is removed.
    pub fn set(&mut self, role: &str, fields: Vec<FieldDescriptor>) {
        let fields: Vec<FieldDescriptor> = fields
            .into_iter()
            .filter(|f| !f.name.is_empty())
            .collect();
        if fields.is_empty() {
            self.roles.shift_remove(role);
        } else {
            self.roles.insert(role.to_string(), fields);
        }
    }

    pub fn fields(&self, role: Role) -> &[FieldDescriptor] {
        self.roles
            .get(role.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, role: Role) -> Option<&FieldDescriptor> {
        self.fields(role).first()
    }

    pub fn names(&self, role: Role) -> Vec<&str> {
        self.fields(role).iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_bound(&self, role: Role) -> bool {
        !self.fields(role).is_empty()
    }

    /// Every role name present, in insertion order.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}
