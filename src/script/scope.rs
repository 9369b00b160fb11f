use crate::script::error::ScriptError;
use std::collections::HashMap;

/// Variable frames, innermost last. Lookups walk outward; writes always
/// land in the innermost frame. The global frame is never popped.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<HashMap<String, String>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value.into());
        }
    }

    /// Binds `$0`, `$1..$N`, `$#` and `$@` in the innermost frame.
    pub fn bind_positional(&mut self, zero: &str, args: &[String]) {
        self.set("0", zero);
        for (i, arg) in args.iter().enumerate() {
            self.set((i + 1).to_string(), arg.as_str());
        }
        self.set("#", args.len().to_string());
        self.set("@", args.join(" "));
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces `$name`, `${name}`, `$0-$9`, `$?`, `$#`, `$@` and `$*` using
/// `lookup`; unknown names become empty. `\$` yields a literal dollar and a
/// `$` that starts no reference is kept as is. `$(` is refused.
pub fn expand<F>(text: &str, lookup: F) -> Result<String, ScriptError>
where
    F: Fn(&str) -> Option<String>,
{
    if !text.contains('$') {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'$') {
            chars.next();
            out.push('$');
            continue;
        }
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('(') => {
                return Err(ScriptError::Unsupported("command substitution".to_string()));
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for vc in chars.by_ref() {
                    if vc == '}' {
                        closed = true;
                        break;
                    }
                    name.push(vc);
                }
                if closed && !name.is_empty() {
                    out.push_str(&lookup(&name).unwrap_or_default());
                } else {
                    out.push_str("${");
                    out.push_str(&name);
                    if closed {
                        out.push('}');
                    }
                }
            }
            Some(vc) if vc.is_ascii_digit() || matches!(vc, '?' | '#' | '@' | '*') => {
                chars.next();
                let name = if vc == '*' { "@".to_string() } else { vc.to_string() };
                out.push_str(&lookup(&name).unwrap_or_default());
            }
            Some(vc) if is_name_start(vc) => {
                let mut name = String::new();
                while let Some(&nc) = chars.peek() {
                    if !is_name_char(nc) {
                        break;
                    }
                    name.push(nc);
                    chars.next();
                }
                out.push_str(&lookup(&name).unwrap_or_default());
            }
            _ => out.push('$'),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward_and_writes_innermost() {
        let mut scope = Scope::new();
        scope.set("x", "global");
        scope.push();
        assert_eq!(scope.get("x"), Some("global"));

        scope.set("x", "inner");
        assert_eq!(scope.get("x"), Some("inner"));

        scope.pop();
        assert_eq!(scope.get("x"), Some("global"));
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut scope = Scope::new();
        scope.pop();
        scope.set("a", "1");
        scope.push();
        scope.set("b", "2");
        scope.pop();
        scope.pop();
        assert_eq!(scope.get("a"), Some("1"));
        assert_eq!(scope.get("b"), None);
    }

    #[test]
    fn test_expand_forms() {
        let mut scope = Scope::new();
        scope.set("name", "lish");
        scope.bind_positional("script.lsh", &["one".to_string(), "two".to_string()]);
        let lookup = |n: &str| scope.get(n).map(str::to_string);

        assert_eq!(expand("hi $name!", lookup).unwrap(), "hi lish!");
        assert_eq!(expand("${name}_x $name_x", lookup).unwrap(), "lish_x ");
        assert_eq!(expand("$0 $1 $2 $3", lookup).unwrap(), "script.lsh one two ");
        assert_eq!(expand("$# [$@] [$*]", lookup).unwrap(), "2 [one two] [one two]");
        assert_eq!(expand("cost: 5$ \\$name ${", lookup).unwrap(), "cost: 5$ $name ${");
    }

    #[test]
    fn test_expand_refuses_command_substitution() {
        let err = expand("now: $(date)", |_| None).unwrap_err();
        assert!(matches!(err, ScriptError::Unsupported(_)));
    }
}
