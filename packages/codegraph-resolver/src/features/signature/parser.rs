//! Member signature parsing
//!
//! Two textual forms are accepted:
//!
//! - descriptor form: `La/b/C;->count:I`, `La/b/C;->run(ILjava/lang/String;)V`,
//!   `La/b/C;-><init>(J)V`
//! - qualified form: `a.b.C.count`, `a.b.C.count:int`,
//!   `a.b.C.run(int,java.lang.String)void`, `a.b.C.<init>(long)`

use crate::errors::{ResolverError, ResolverResult};
use crate::shared::utils::descriptor::{from_descriptor, normalize_type_name, split_descriptors};

pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureShape {
    /// No parameter list; the type is optional
    Field { field_type: Option<String> },
    /// Parameter list present; the return type is optional
    Executable {
        parameters: Vec<String>,
        return_type: Option<String>,
    },
}

/// Parsed member signature; every type is a qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSignature {
    pub owner: String,
    pub name: String,
    pub shape: SignatureShape,
}

impl MemberSignature {
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME && matches!(self.shape, SignatureShape::Executable { .. })
    }
}

pub fn parse(text: &str) -> ResolverResult<MemberSignature> {
    let text = text.trim();
    match text.split_once("->") {
        Some((owner, rest)) => parse_descriptor_form(text, owner, rest),
        None => parse_qualified_form(text),
    }
}

fn invalid(text: &str, reason: &str) -> ResolverError {
    ResolverError::invalid_signature(text, reason)
}

fn type_name(text: &str, part: &str) -> ResolverResult<String> {
    normalize_type_name(part).ok_or_else(|| invalid(text, &format!("bad type '{}'", part)))
}

fn member_name<'a>(text: &str, name: &'a str) -> ResolverResult<&'a str> {
    if name.is_empty() || name.contains(['(', ')', ':', ',']) {
        return Err(invalid(text, "missing or malformed member name"));
    }
    Ok(name)
}

fn parse_descriptor_form(text: &str, owner: &str, rest: &str) -> ResolverResult<MemberSignature> {
    let owner = from_descriptor(owner).ok_or_else(|| invalid(text, "owner is not a descriptor"))?;

    if let Some(open) = rest.find('(') {
        let close = rest
            .find(')')
            .filter(|close| *close > open)
            .ok_or_else(|| invalid(text, "unterminated parameter list"))?;
        let name = member_name(text, &rest[..open])?;
        let parameters = split_descriptors(&rest[open + 1..close])
            .ok_or_else(|| invalid(text, "bad parameter descriptors"))?;
        let return_text = &rest[close + 1..];
        let return_type = if return_text.is_empty() {
            None
        } else {
            Some(from_descriptor(return_text).ok_or_else(|| invalid(text, "bad return descriptor"))?)
        };
        return Ok(MemberSignature {
            owner,
            name: name.to_string(),
            shape: SignatureShape::Executable {
                parameters,
                return_type,
            },
        });
    }

    let (name, field_type) = match rest.split_once(':') {
        Some((name, descriptor)) => (
            name,
            Some(from_descriptor(descriptor).ok_or_else(|| invalid(text, "bad field descriptor"))?),
        ),
        None => (rest, None),
    };
    Ok(MemberSignature {
        owner,
        name: member_name(text, name)?.to_string(),
        shape: SignatureShape::Field { field_type },
    })
}

fn split_owner<'a>(text: &str, head: &'a str) -> ResolverResult<(&'a str, &'a str)> {
    head.rsplit_once('.')
        .filter(|(owner, _)| !owner.is_empty())
        .ok_or_else(|| invalid(text, "expected Owner.name"))
}

fn parse_qualified_form(text: &str) -> ResolverResult<MemberSignature> {
    if let Some(open) = text.find('(') {
        let close = text
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| invalid(text, "unterminated parameter list"))?;
        let (owner, name) = split_owner(text, &text[..open])?;
        let parameters = text[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| type_name(text, p))
            .collect::<ResolverResult<Vec<_>>>()?;
        let return_text = text[close + 1..].trim();
        let return_type = if return_text.is_empty() {
            None
        } else {
            Some(type_name(text, return_text)?)
        };
        return Ok(MemberSignature {
            owner: type_name(text, owner)?,
            name: member_name(text, name)?.to_string(),
            shape: SignatureShape::Executable {
                parameters,
                return_type,
            },
        });
    }

    let (head, field_type) = match text.split_once(':') {
        Some((head, ty)) => (head, Some(type_name(text, ty)?)),
        None => (text, None),
    };
    let (owner, name) = split_owner(text, head)?;
    Ok(MemberSignature {
        owner: type_name(text, owner)?,
        name: member_name(text, name)?.to_string(),
        shape: SignatureShape::Field { field_type },
    })
}
