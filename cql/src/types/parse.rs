use thiserror::Error;

use crate::types::NativeType;

/// Errors produced while parsing a CQL type definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeParseError {
    #[error("unexpected end of type definition")]
    UnexpectedEnd,

    #[error("expected `{expected}` at position {position}, found `{found}`")]
    UnexpectedCharacter {
        position: usize,
        expected: char,
        found: char,
    },

    #[error("expected a type name at position {position}")]
    ExpectedTypeName { position: usize },

    #[error("`{name}` takes {expected} type parameter(s), found {found}")]
    WrongParameterCount {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unsupported type `{0}`")]
    UnsupportedType(String),

    #[error("unexpected trailing input at position {position}")]
    TrailingInput { position: usize },
}

/// Syntax tree of a CQL type definition as stored in the catalog.
///
/// User-defined types are kept as references by name; resolving them requires the keyspace's
/// type definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Native(NativeType),
    List(Box<TypeSpec>),
    Set(Box<TypeSpec>),
    Map(Box<TypeSpec>, Box<TypeSpec>),
    Tuple(Vec<TypeSpec>),
    Frozen(Box<TypeSpec>),
    UserType(String),
}

/// Parses a CQL type definition such as `frozen<map<text, list<int>>>`.
pub fn parse_type(input: &str) -> Result<TypeSpec, TypeParseError> {
    let mut parser = Parser { input, position: 0 };
    let spec = parser.parse_type()?;

    parser.skip_whitespace();
    if parser.position != input.len() {
        return Err(TypeParseError::TrailingInput {
            position: parser.position,
        });
    }

    Ok(spec)
}

struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.position += c.len_utf8();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump(c);
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump(c);
                Ok(())
            }
            Some(found) => Err(TypeParseError::UnexpectedCharacter {
                position: self.position,
                expected,
                found,
            }),
            None => Err(TypeParseError::UnexpectedEnd),
        }
    }

    /// Reads a type name, returning it together with whether it was double-quoted.
    fn type_name(&mut self) -> Result<(String, bool), TypeParseError> {
        self.skip_whitespace();

        if self.peek() == Some('"') {
            self.bump('"');
            let mut name = String::new();
            loop {
                match self.peek() {
                    Some('"') => {
                        self.bump('"');
                        if self.peek() == Some('"') {
                            self.bump('"');
                            name.push('"');
                        } else {
                            return Ok((name, true));
                        }
                    }
                    Some(c) => {
                        self.bump(c);
                        name.push(c);
                    }
                    None => return Err(TypeParseError::UnexpectedEnd),
                }
            }
        }

        let start = self.position;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.bump(c);
        }

        if start == self.position {
            return match self.peek() {
                Some(_) => Err(TypeParseError::ExpectedTypeName { position: start }),
                None => Err(TypeParseError::UnexpectedEnd),
            };
        }

        Ok((self.input[start..self.position].to_string(), false))
    }

    fn parse_type(&mut self) -> Result<TypeSpec, TypeParseError> {
        let (name, quoted) = self.type_name()?;
        if quoted {
            return Ok(TypeSpec::UserType(name));
        }

        let spec = match name.to_ascii_lowercase().as_str() {
            "list" => {
                let [element] = self.parameters::<1>("list")?;
                TypeSpec::List(Box::new(element))
            }
            "set" => {
                let [element] = self.parameters::<1>("set")?;
                TypeSpec::Set(Box::new(element))
            }
            "map" => {
                let [key, value] = self.parameters::<2>("map")?;
                TypeSpec::Map(Box::new(key), Box::new(value))
            }
            "frozen" => {
                let [inner] = self.parameters::<1>("frozen")?;
                TypeSpec::Frozen(Box::new(inner))
            }
            "tuple" => TypeSpec::Tuple(self.parameter_list()?),
            "vector" => return Err(TypeParseError::UnsupportedType(name)),
            lowered => match lowered.parse::<NativeType>() {
                Ok(native) => TypeSpec::Native(native),
                Err(_) => TypeSpec::UserType(name),
            },
        };

        Ok(spec)
    }

    fn parameter_list(&mut self) -> Result<Vec<TypeSpec>, TypeParseError> {
        self.expect('<')?;

        let mut parameters = vec![self.parse_type()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump(',');
                    parameters.push(self.parse_type()?);
                }
                Some('>') => {
                    self.bump('>');
                    return Ok(parameters);
                }
                Some(found) => {
                    return Err(TypeParseError::UnexpectedCharacter {
                        position: self.position,
                        expected: '>',
                        found,
                    });
                }
                None => return Err(TypeParseError::UnexpectedEnd),
            }
        }
    }

    fn parameters<const N: usize>(
        &mut self,
        name: &'static str,
    ) -> Result<[TypeSpec; N], TypeParseError> {
        let parameters = self.parameter_list()?;
        let found = parameters.len();

        <[TypeSpec; N]>::try_from(parameters).map_err(|_| TypeParseError::WrongParameterCount {
            name,
            expected: N,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(native: NativeType) -> Box<TypeSpec> {
        Box::new(TypeSpec::Native(native))
    }

    #[test]
    fn parses_native_types() {
        assert_eq!(parse_type("int"), Ok(TypeSpec::Native(NativeType::Int)));
        assert_eq!(parse_type(" varchar "), Ok(TypeSpec::Native(NativeType::Text)));
    }

    #[test]
    fn parses_nested_collections() {
        assert_eq!(
            parse_type("map<text, frozen<list<int>>>"),
            Ok(TypeSpec::Map(
                native(NativeType::Text),
                Box::new(TypeSpec::Frozen(Box::new(TypeSpec::List(native(
                    NativeType::Int
                )))))
            ))
        );
    }

    #[test]
    fn parses_tuples_and_user_types() {
        assert_eq!(
            parse_type("tuple<int, address, \"Geo\"\"Point\">"),
            Ok(TypeSpec::Tuple(vec![
                TypeSpec::Native(NativeType::Int),
                TypeSpec::UserType("address".to_string()),
                TypeSpec::UserType("Geo\"Point".to_string()),
            ]))
        );
    }

    #[test]
    fn quoted_native_name_is_a_user_type() {
        assert_eq!(
            parse_type("\"int\""),
            Ok(TypeSpec::UserType("int".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_definitions() {
        assert_eq!(parse_type("list<int"), Err(TypeParseError::UnexpectedEnd));
        assert_eq!(
            parse_type("map<int>"),
            Err(TypeParseError::WrongParameterCount {
                name: "map",
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            parse_type("int>"),
            Err(TypeParseError::TrailingInput { position: 3 })
        );
        assert_eq!(
            parse_type("list<>"),
            Err(TypeParseError::ExpectedTypeName { position: 5 })
        );
        assert_eq!(
            parse_type("vector<float, 3>"),
            Err(TypeParseError::UnsupportedType("vector".to_string()))
        );
    }
}
