//! Entity models
//!
//! Entities are owned by the corpus. The engine only passes around these
//! cheap handles (`Arc<str>` names plus the attributes needed for identity
//! and predicate checks).

use super::modifiers::Modifiers;
use crate::shared::utils::descriptor::to_descriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Entity kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Type,
    Field,
    Method,
    Constructor,
    String,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Field => "field",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::String => "string",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type, identified by its qualified name (`a.b.C`, `int`, `a.b.C[]`)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeEntity {
    pub name: Arc<str>,
}

impl TypeEntity {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Array type handle `X[]`
    pub fn array_of(&self) -> TypeEntity {
        TypeEntity::new(format!("{}[]", self.name))
    }
}

impl fmt::Debug for TypeEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldEntity {
    pub declaring: Arc<str>,
    pub name: Arc<str>,
    pub field_type: Arc<str>,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodEntity {
    pub declaring: Arc<str>,
    pub name: Arc<str>,
    #[serde(default)]
    pub parameters: Vec<Arc<str>>,
    pub return_type: Arc<str>,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorEntity {
    pub declaring: Arc<str>,
    #[serde(default)]
    pub parameters: Vec<Arc<str>>,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// A string literal from the corpus's constant pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringEntity(pub Arc<str>);

impl StringEntity {
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Tagged union over every entity kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Type(TypeEntity),
    Field(FieldEntity),
    Method(MethodEntity),
    Constructor(ConstructorEntity),
    String(StringEntity),
}

impl Entity {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Type(_) => Kind::Type,
            Self::Field(_) => Kind::Field,
            Self::Method(_) => Kind::Method,
            Self::Constructor(_) => Kind::Constructor,
            Self::String(_) => Kind::String,
        }
    }

    pub fn identifier(&self) -> String {
        match self {
            Self::Type(e) => e.identifier(),
            Self::Field(e) => e.identifier(),
            Self::Method(e) => e.identifier(),
            Self::Constructor(e) => e.identifier(),
            Self::String(e) => e.identifier(),
        }
    }
}

/// Capability shared by every concrete entity kind
///
/// `identifier` is the canonical textual form persisted in cache snapshots:
/// qualified names for types, descriptor signatures for members
/// (`La/B;->name:I`, `La/B;->m(I)V`, `La/B;-><init>(I)V`), raw values for strings.
pub trait EntityKind: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static {
    const KIND: Kind;

    fn identifier(&self) -> String;

    fn into_entity(self) -> Entity;

    fn from_entity(entity: Entity) -> Option<Self>;
}

fn parameter_descriptors(parameters: &[Arc<str>]) -> String {
    parameters.iter().map(|p| to_descriptor(p)).collect()
}

impl EntityKind for TypeEntity {
    const KIND: Kind = Kind::Type;

    fn identifier(&self) -> String {
        self.name.to_string()
    }

    fn into_entity(self) -> Entity {
        Entity::Type(self)
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Type(e) => Some(e),
            _ => None,
        }
    }
}

impl EntityKind for FieldEntity {
    const KIND: Kind = Kind::Field;

    fn identifier(&self) -> String {
        format!(
            "{}->{}:{}",
            to_descriptor(&self.declaring),
            self.name,
            to_descriptor(&self.field_type)
        )
    }

    fn into_entity(self) -> Entity {
        Entity::Field(self)
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl EntityKind for MethodEntity {
    const KIND: Kind = Kind::Method;

    fn identifier(&self) -> String {
        format!(
            "{}->{}({}){}",
            to_descriptor(&self.declaring),
            self.name,
            parameter_descriptors(&self.parameters),
            to_descriptor(&self.return_type)
        )
    }

    fn into_entity(self) -> Entity {
        Entity::Method(self)
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Method(e) => Some(e),
            _ => None,
        }
    }
}

impl EntityKind for ConstructorEntity {
    const KIND: Kind = Kind::Constructor;

    fn identifier(&self) -> String {
        format!(
            "{}-><init>({})V",
            to_descriptor(&self.declaring),
            parameter_descriptors(&self.parameters)
        )
    }

    fn into_entity(self) -> Entity {
        Entity::Constructor(self)
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Constructor(e) => Some(e),
            _ => None,
        }
    }
}

impl EntityKind for StringEntity {
    const KIND: Kind = Kind::String;

    fn identifier(&self) -> String {
        self.0.to_string()
    }

    fn into_entity(self) -> Entity {
        Entity::String(self)
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::String(e) => Some(e),
            _ => None,
        }
    }
}

/// Field, method or constructor
pub trait Member: EntityKind {
    fn declaring(&self) -> &Arc<str>;

    fn modifiers(&self) -> Modifiers;

    fn declaring_type(&self) -> TypeEntity {
        TypeEntity::new(self.declaring().clone())
    }
}

/// Method or constructor
pub trait Executable: Member {
    fn parameters(&self) -> &[Arc<str>];
}

impl Member for FieldEntity {
    fn declaring(&self) -> &Arc<str> {
        &self.declaring
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl Member for MethodEntity {
    fn declaring(&self) -> &Arc<str> {
        &self.declaring
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl Member for ConstructorEntity {
    fn declaring(&self) -> &Arc<str> {
        &self.declaring
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl Executable for MethodEntity {
    fn parameters(&self) -> &[Arc<str>] {
        &self.parameters
    }
}

impl Executable for ConstructorEntity {
    fn parameters(&self) -> &[Arc<str>] {
        &self.parameters
    }
}

/// Structural detail of a type, fetched lazily from the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDetail {
    pub name: Arc<str>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub super_type: Option<Arc<str>>,
    #[serde(default)]
    pub interfaces: Vec<Arc<str>>,
    #[serde(default)]
    pub fields: Vec<FieldEntity>,
    #[serde(default)]
    pub methods: Vec<MethodEntity>,
    #[serde(default)]
    pub constructors: Vec<ConstructorEntity>,
}

impl TypeDetail {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::NONE,
            super_type: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn entity(&self) -> TypeEntity {
        TypeEntity::new(self.name.clone())
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_super_type(mut self, name: &str) -> Self {
        self.super_type = Some(Arc::from(name));
        self
    }

    pub fn with_interface(mut self, name: &str) -> Self {
        self.interfaces.push(Arc::from(name));
        self
    }

    pub fn with_field(mut self, name: &str, field_type: &str, modifiers: Modifiers) -> Self {
        self.fields.push(FieldEntity {
            declaring: self.name.clone(),
            name: Arc::from(name),
            field_type: Arc::from(field_type),
            modifiers,
        });
        self
    }

    pub fn with_method(
        mut self,
        name: &str,
        parameters: &[&str],
        return_type: &str,
        modifiers: Modifiers,
    ) -> Self {
        self.methods.push(MethodEntity {
            declaring: self.name.clone(),
            name: Arc::from(name),
            parameters: parameters.iter().map(|p| Arc::from(*p)).collect(),
            return_type: Arc::from(return_type),
            modifiers,
        });
        self
    }

    pub fn with_constructor(mut self, parameters: &[&str], modifiers: Modifiers) -> Self {
        self.constructors.push(ConstructorEntity {
            declaring: self.name.clone(),
            parameters: parameters.iter().map(|p| Arc::from(*p)).collect(),
            modifiers,
        });
        self
    }
}
