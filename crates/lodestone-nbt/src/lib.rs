use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

pub use indexmap::IndexMap;

/// Wire discriminant of a tag payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagId {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl TagId {
    pub fn from_u8(raw: u8) -> Option<TagId> {
        match raw {
            0 => Some(TagId::End),
            1 => Some(TagId::Byte),
            2 => Some(TagId::Short),
            3 => Some(TagId::Int),
            4 => Some(TagId::Long),
            5 => Some(TagId::Float),
            6 => Some(TagId::Double),
            7 => Some(TagId::ByteArray),
            8 => Some(TagId::String),
            9 => Some(TagId::List),
            10 => Some(TagId::Compound),
            11 => Some(TagId::IntArray),
            12 => Some(TagId::LongArray),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            TagId::End => 0,
            TagId::Byte => 1,
            TagId::Short => 2,
            TagId::Int => 3,
            TagId::Long => 4,
            TagId::Float => 5,
            TagId::Double => 6,
            TagId::ByteArray => 7,
            TagId::String => 8,
            TagId::List => 9,
            TagId::Compound => 10,
            TagId::IntArray => 11,
            TagId::LongArray => 12,
        }
    }
}

/// One node of a named-binary-tag tree. Compounds keep insertion order so a
/// decoded tree re-encodes to the same byte stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(IndexMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let length = reader.read_u16::<BigEndian>()?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| invalid_data(format!("malformed tag string: {}", e)))
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    if value.len() > u16::MAX as usize {
        return Err(invalid_data(format!(
            "tag string of {} bytes exceeds the wire limit",
            value.len()
        )));
    }
    writer.write_u16::<BigEndian>(value.len() as u16)?;
    writer.write_all(value.as_bytes())
}

impl Tag {
    pub fn id(&self) -> TagId {
        match self {
            Tag::End => TagId::End,
            Tag::Byte(_) => TagId::Byte,
            Tag::Short(_) => TagId::Short,
            Tag::Int(_) => TagId::Int,
            Tag::Long(_) => TagId::Long,
            Tag::Float(_) => TagId::Float,
            Tag::Double(_) => TagId::Double,
            Tag::ByteArray(_) => TagId::ByteArray,
            Tag::String(_) => TagId::String,
            Tag::List(_) => TagId::List,
            Tag::Compound(_) => TagId::Compound,
            Tag::IntArray(_) => TagId::IntArray,
            Tag::LongArray(_) => TagId::LongArray,
        }
    }

    /// Reads one named tag: discriminant, name, payload.
    pub fn read_named<R: Read>(reader: &mut R) -> io::Result<(String, Tag)> {
        let raw = reader.read_u8()?;
        let id = TagId::from_u8(raw).ok_or_else(|| invalid_data(format!("unknown tag id {}", raw)))?;
        if id == TagId::End {
            return Ok((String::new(), Tag::End));
        }

        let name = read_string(reader)?;
        let tag = Tag::read_payload(reader, id)?;
        Ok((name, tag))
    }

    fn read_payload<R: Read>(reader: &mut R, id: TagId) -> io::Result<Tag> {
        match id {
            TagId::End => Ok(Tag::End),
            TagId::Byte => Ok(Tag::Byte(reader.read_i8()?)),
            TagId::Short => Ok(Tag::Short(reader.read_i16::<BigEndian>()?)),
            TagId::Int => Ok(Tag::Int(reader.read_i32::<BigEndian>()?)),
            TagId::Long => Ok(Tag::Long(reader.read_i64::<BigEndian>()?)),
            TagId::Float => Ok(Tag::Float(reader.read_f32::<BigEndian>()?)),
            TagId::Double => Ok(Tag::Double(reader.read_f64::<BigEndian>()?)),
            TagId::ByteArray => {
                let length = read_array_length(reader)?;
                let mut bytes = vec![0u8; length];
                reader.read_exact(&mut bytes)?;
                Ok(Tag::ByteArray(bytes.into_iter().map(|b| b as i8).collect()))
            }
            TagId::String => Ok(Tag::String(read_string(reader)?)),
            TagId::List => {
                let raw = reader.read_u8()?;
                let element_id = TagId::from_u8(raw)
                    .ok_or_else(|| invalid_data(format!("unknown list element id {}", raw)))?;
                let length = read_array_length(reader)?;
                let mut elements = Vec::with_capacity(length);
                for _ in 0..length {
                    elements.push(Tag::read_payload(reader, element_id)?);
                }
                Ok(Tag::List(elements))
            }
            TagId::Compound => {
                let mut entries = IndexMap::new();
                loop {
                    let (name, tag) = Tag::read_named(reader)?;
                    if tag == Tag::End {
                        break;
                    }
                    entries.insert(name, tag);
                }
                Ok(Tag::Compound(entries))
            }
            TagId::IntArray => {
                let length = read_array_length(reader)?;
                let mut values = Vec::with_capacity(length);
                for _ in 0..length {
                    values.push(reader.read_i32::<BigEndian>()?);
                }
                Ok(Tag::IntArray(values))
            }
            TagId::LongArray => {
                let length = read_array_length(reader)?;
                let mut values = Vec::with_capacity(length);
                for _ in 0..length {
                    values.push(reader.read_i64::<BigEndian>()?);
                }
                Ok(Tag::LongArray(values))
            }
        }
    }

    /// Writes one named tag: discriminant, name, payload.
    pub fn write_named<W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
        writer.write_u8(self.id().as_u8())?;
        if *self != Tag::End {
            write_string(writer, name)?;
        }
        self.write_payload(writer)
    }

    fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Tag::End => Ok(()),
            Tag::Byte(v) => writer.write_i8(*v),
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v),
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v),
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v),
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v),
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v),
            Tag::ByteArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                let bytes: Vec<u8> = v.iter().map(|&b| b as u8).collect();
                writer.write_all(&bytes)
            }
            Tag::String(v) => write_string(writer, v),
            Tag::List(v) => {
                // An empty list carries TAG_End as its element type.
                let element_id = v.first().map(Tag::id).unwrap_or(TagId::End);
                writer.write_u8(element_id.as_u8())?;
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for element in v {
                    element.write_payload(writer)?;
                }
                Ok(())
            }
            Tag::Compound(entries) => {
                for (name, tag) in entries {
                    tag.write_named(writer, name)?;
                }
                Tag::End.write_named(writer, "")
            }
            Tag::IntArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &value in v {
                    writer.write_i32::<BigEndian>(value)?;
                }
                Ok(())
            }
            Tag::LongArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for &value in v {
                    writer.write_i64::<BigEndian>(value)?;
                }
                Ok(())
            }
        }
    }

    /// Reads a gzip-compressed named tag stream.
    pub fn read_named_gzip<R: Read>(reader: &mut R) -> io::Result<(String, Tag)> {
        let mut decoder = GzDecoder::new(reader);
        Tag::read_named(&mut decoder)
    }

    /// Writes this tag as a gzip-compressed named tag stream.
    pub fn write_named_gzip<W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write_named(&mut encoder, name)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn as_compound(&self) -> Option<&IndexMap<String, Tag>> {
        match self {
            Tag::Compound(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        match self {
            Tag::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Tag::Short(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }
}

fn read_array_length<R: Read>(reader: &mut R) -> io::Result<usize> {
    let length = reader.read_i32::<BigEndian>()?;
    if length < 0 {
        return Err(invalid_data(format!("negative array length {}", length)));
    }
    Ok(length as usize)
}
