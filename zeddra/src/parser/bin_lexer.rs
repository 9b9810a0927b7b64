use nom::bytes::complete::tag;
use nom::number::complete::le_u32;
use nom::sequence::tuple;
use nom::IResult;

/// Marker opening every diagram dump.
pub const MAGIC: [u8; 4] = *b"ZDDB";

/// Highest format version this engine understands.
pub const SUPPORTED_VERSION: u32 = 1;

/// Width of one node record in bytes: variable, low and high words.
pub const RECORD_WIDTH: usize = 12;

/// The fixed-width words following the magic marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeader {
    pub version: u32,
    pub node_count: u32,
    pub variable_count: u32,
}

/// One undecoded node record: the tested variable and the raw child words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNode {
    pub variable: u32,
    pub low: u32,
    pub high: u32,
}

/// Lexes the magic marker and the header words.
///
/// # Examples
///
/// ```
/// use zeddra::parser::bin_lexer::{lex_header, RawHeader, MAGIC};
///
/// let mut bytes = MAGIC.to_vec();
/// for word in [1u32, 5, 9] {
///     bytes.extend_from_slice(&word.to_le_bytes());
/// }
///
/// let (rest, header) = lex_header(&bytes).unwrap();
/// assert!(rest.is_empty());
/// assert_eq!(
///     header,
///     RawHeader { version: 1, node_count: 5, variable_count: 9 }
/// );
/// ```
pub fn lex_header(input: &[u8]) -> IResult<&[u8], RawHeader> {
    let (input, _) = tag(&MAGIC[..])(input)?;
    let (input, (version, node_count, variable_count)) = tuple((le_u32, le_u32, le_u32))(input)?;

    Ok((
        input,
        RawHeader {
            version,
            node_count,
            variable_count,
        },
    ))
}

/// Lexes one fixed-width node record.
pub fn lex_node(input: &[u8]) -> IResult<&[u8], RawNode> {
    let (input, (variable, low, high)) = tuple((le_u32, le_u32, le_u32))(input)?;

    Ok((
        input,
        RawNode {
            variable,
            low,
            high,
        },
    ))
}

/// Lexes the root reference word trailing the record section.
pub fn lex_root(input: &[u8]) -> IResult<&[u8], u32> {
    le_u32(input)
}
