use crate::protocol::parts::CalcFailure;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

// Parsed form of a Function frame body:
// name_len:u8 | name | arg_count:u16 BE | (arg_len:u32 BE | arg_bytes)*
// The argument payloads stay opaque here; decoding them needs the
// registered parameter types and happens in the dispatcher.
#[derive(Debug)]
pub(crate) struct FunctionRequest {
    pub name: String,
    pub args: Vec<Vec<u8>>,
}

impl FunctionRequest {
    // A malformed body is surfaced to the supervisor as a Decode failure;
    // the enclosing frame was well-formed, so the connection stays usable.
    pub fn parse(body: &[u8]) -> Result<Self, CalcFailure> {
        let mut rdr = body;

        let name_len = rdr.read_u8().map_err(|_| malformed("name length"))?;
        let mut name_bytes = vec![0_u8; name_len as usize];
        rdr.read_exact(&mut name_bytes)
            .map_err(|_| malformed("name"))?;
        let name = String::from_utf8(name_bytes)
            .map_err(|_| CalcFailure::new("Decode", "function name is not valid UTF-8"))?;

        let arg_count = rdr
            .read_u16::<BigEndian>()
            .map_err(|_| malformed("argument count"))?;
        let mut args = Vec::with_capacity(arg_count as usize);
        for i in 0..arg_count {
            let arg_len = rdr
                .read_u32::<BigEndian>()
                .map_err(|_| malformed_arg(i, "length"))?;
            let mut arg_bytes = vec![0_u8; arg_len as usize];
            rdr.read_exact(&mut arg_bytes)
                .map_err(|_| malformed_arg(i, "payload"))?;
            args.push(arg_bytes);
        }

        Ok(Self { name, args })
    }
}

fn malformed(what: &str) -> CalcFailure {
    CalcFailure::new("Decode", format!("function body ends within the {what}"))
}

fn malformed_arg(index: u16, what: &str) -> CalcFailure {
    CalcFailure::new(
        "Decode",
        format!("function body ends within the {what} of argument {index}"),
    )
}
