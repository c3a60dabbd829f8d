use crate::error::Error;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Source languages accepted by the MOSS server.
///
/// The textual form is the identifier sent on the `language` protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Language {
    #[default]
    C,
    Cc,
    Java,
    Ml,
    Pascal,
    Ada,
    Lisp,
    Scheme,
    Haskell,
    Fortran,
    Ascii,
    Vhdl,
    Perl,
    Matlab,
    Python,
    Mips,
    Prolog,
    Spice,
    Vb,
    CSharp,
    Modula2,
    A8086,
    JavaScript,
    PlSql,
    Verilog,
}

impl Language {
    /// Every accepted language, in the order the server documents them.
    pub const ALL: [Language; 25] = [
        Language::C,
        Language::Cc,
        Language::Java,
        Language::Ml,
        Language::Pascal,
        Language::Ada,
        Language::Lisp,
        Language::Scheme,
        Language::Haskell,
        Language::Fortran,
        Language::Ascii,
        Language::Vhdl,
        Language::Perl,
        Language::Matlab,
        Language::Python,
        Language::Mips,
        Language::Prolog,
        Language::Spice,
        Language::Vb,
        Language::CSharp,
        Language::Modula2,
        Language::A8086,
        Language::JavaScript,
        Language::PlSql,
        Language::Verilog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cc => "cc",
            Language::Java => "java",
            Language::Ml => "ml",
            Language::Pascal => "pascal",
            Language::Ada => "ada",
            Language::Lisp => "lisp",
            Language::Scheme => "scheme",
            Language::Haskell => "haskell",
            Language::Fortran => "fortran",
            Language::Ascii => "ascii",
            Language::Vhdl => "vhdl",
            Language::Perl => "perl",
            Language::Matlab => "matlab",
            Language::Python => "python",
            Language::Mips => "mips",
            Language::Prolog => "prolog",
            Language::Spice => "spice",
            Language::Vb => "vb",
            Language::CSharp => "csharp",
            Language::Modula2 => "modula2",
            Language::A8086 => "a8086",
            Language::JavaScript => "javascript",
            Language::PlSql => "plsql",
            Language::Verilog => "verilog",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_round_trips_through_text() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        for name in ["", "C", "rust", "c++", " java", "python3"] {
            match name.parse::<Language>() {
                Err(Error::UnsupportedLanguage(got)) => assert_eq!(got, name),
                other => panic!("expected UnsupportedLanguage for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_default_is_c() {
        assert_eq!(Language::default(), Language::C);
        assert_eq!(Language::default().to_string(), "c");
    }
}
