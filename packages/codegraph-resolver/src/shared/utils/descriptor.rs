//! Type descriptor conversions
//!
//! Qualified names (`a.b.C`, `int`, `a.b.C[]`) and JVM descriptors
//! (`La/b/C;`, `I`, `[La/b/C;`) are both accepted throughout the crate.
//! Primitive single-letter abbreviations map bidirectionally.

const PRIMITIVES: [(char, &str); 9] = [
    ('I', "int"),
    ('Z', "boolean"),
    ('F', "float"),
    ('J', "long"),
    ('S', "short"),
    ('B', "byte"),
    ('D', "double"),
    ('C', "char"),
    ('V', "void"),
];

/// `I` → `int`
pub fn primitive_name(abbreviation: char) -> Option<&'static str> {
    PRIMITIVES
        .iter()
        .find(|(c, _)| *c == abbreviation)
        .map(|(_, name)| *name)
}

/// `int` → `I`
pub fn primitive_abbreviation(name: &str) -> Option<char> {
    PRIMITIVES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(c, _)| *c)
}

/// Qualified name → descriptor (`a.b.C[]` → `[La/b/C;`)
pub fn to_descriptor(name: &str) -> String {
    let mut base = name;
    let mut dims = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
        dims += 1;
    }

    let mut out = "[".repeat(dims);
    match primitive_abbreviation(base) {
        Some(c) => out.push(c),
        None => {
            out.push('L');
            out.push_str(&base.replace('.', "/"));
            out.push(';');
        }
    }
    out
}

/// Descriptor → qualified name; `None` when the descriptor is malformed
/// or has trailing characters
pub fn from_descriptor(descriptor: &str) -> Option<String> {
    let (name, used) = parse_one(descriptor)?;
    (used == descriptor.len()).then_some(name)
}

/// Split a concatenated descriptor list (`ILa/B;[J`) into qualified names
pub fn split_descriptors(list: &str) -> Option<Vec<String>> {
    let mut rest = list;
    let mut names = Vec::new();
    while !rest.is_empty() {
        let (name, used) = parse_one(rest)?;
        names.push(name);
        rest = &rest[used..];
    }
    Some(names)
}

/// Parse one descriptor at the start of `input`, returning the name and the
/// number of bytes consumed
fn parse_one(input: &str) -> Option<(String, usize)> {
    let dims = input.bytes().take_while(|b| *b == b'[').count();
    let rest = &input[dims..];
    let first = rest.chars().next()?;

    let (base, used) = if first == 'L' {
        let end = rest.find(';')?;
        let inner = &rest[1..end];
        if inner.is_empty() {
            return None;
        }
        (inner.replace('/', "."), end + 1)
    } else {
        (primitive_name(first)?.to_string(), 1)
    };

    let mut name = base;
    for _ in 0..dims {
        name.push_str("[]");
    }
    Some((name, dims + used))
}

/// Accept either form and normalise to a qualified name
pub fn normalize_type_name(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let looks_like_descriptor = text.starts_with('[')
        || (text.starts_with('L') && text.ends_with(';'))
        || (text.len() == 1 && primitive_name(text.chars().next()?).is_some());
    if looks_like_descriptor {
        from_descriptor(text)
    } else {
        Some(text.to_string())
    }
}
