//! Binary snapshot of the backing tables.
//!
//! Length-prefixed little-endian layout: magic, then per table its name,
//! next key, primary records, and secondary indexes. Saves go to a
//! sibling temp file first so a crash mid-write leaves the previous
//! snapshot intact.

use crate::tables::Table;
use crate::tables::Tables;
use byteorder::LittleEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use pfc_core::*;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

const MAGIC: &[u8; 8] = b"PFCSNAP1";

pub(crate) fn save(path: &Path, tables: &Tables) -> Outcome<()> {
    let temp = path.with_extension("tmp");
    {
        let file = std::fs::File::create(&temp)?;
        let mut out = BufWriter::new(file);
        out.write_all(MAGIC)?;
        out.write_u32::<LittleEndian>(tables.tables.len() as u32)?;
        for (name, table) in &tables.tables {
            write_str(&mut out, name)?;
            write_table(&mut out, table)?;
        }
        out.flush()?;
    }
    std::fs::rename(&temp, path)?;
    Ok(())
}

pub(crate) fn load(path: &Path) -> Outcome<Tables> {
    let file = std::fs::File::open(path)?;
    let mut input = BufReader::new(file);
    let mut magic = [0u8; 8];
    input.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return corrupt(format!("{} is not a perfcalc snapshot", path.display()));
    }
    let mut tables = Tables::default();
    let count = input.read_u32::<LittleEndian>()?;
    for _ in 0..count {
        let name = read_str(&mut input)?;
        let table = read_table(&mut input)?;
        tables.tables.insert(name, table);
    }
    Ok(tables)
}

fn write_table(out: &mut impl Write, table: &Table) -> Outcome<()> {
    out.write_u64::<LittleEndian>(table.next)?;
    out.write_u64::<LittleEndian>(table.records.len() as u64)?;
    for (key, value) in &table.records {
        out.write_u64::<LittleEndian>(*key)?;
        write_str(out, value)?;
    }
    out.write_u32::<LittleEndian>(table.indexes.len() as u32)?;
    for (name, index) in &table.indexes {
        write_str(out, name)?;
        out.write_u64::<LittleEndian>(index.len() as u64)?;
        for (index_key, keys) in index {
            write_bytes(out, index_key)?;
            out.write_u64::<LittleEndian>(keys.len() as u64)?;
            for key in keys {
                out.write_u64::<LittleEndian>(*key)?;
            }
        }
    }
    Ok(())
}

fn read_table(input: &mut impl Read) -> Outcome<Table> {
    let next = input.read_u64::<LittleEndian>()?;
    let mut records = BTreeMap::new();
    let record_count = input.read_u64::<LittleEndian>()?;
    for _ in 0..record_count {
        let key = input.read_u64::<LittleEndian>()?;
        records.insert(key, read_str(input)?);
    }
    let mut indexes = BTreeMap::new();
    let index_count = input.read_u32::<LittleEndian>()?;
    for _ in 0..index_count {
        let name = read_str(input)?;
        let mut index = BTreeMap::new();
        let entry_count = input.read_u64::<LittleEndian>()?;
        for _ in 0..entry_count {
            let index_key = read_bytes(input)?;
            let key_count = input.read_u64::<LittleEndian>()?;
            let mut keys = BTreeSet::new();
            for _ in 0..key_count {
                keys.insert(input.read_u64::<LittleEndian>()?);
            }
            index.insert(index_key, keys);
        }
        indexes.insert(name, index);
    }
    Ok(Table {
        next,
        records,
        indexes,
    })
}

fn write_bytes(out: &mut impl Write, bytes: &[u8]) -> Outcome<()> {
    out.write_u32::<LittleEndian>(bytes.len() as u32)?;
    out.write_all(bytes)?;
    Ok(())
}

fn read_bytes(input: &mut impl Read) -> Outcome<Vec<u8>> {
    let length = input.read_u32::<LittleEndian>()? as usize;
    let mut bytes = vec![0u8; length];
    input.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn write_str(out: &mut impl Write, value: &str) -> Outcome<()> {
    write_bytes(out, value.as_bytes())
}

fn read_str(input: &mut impl Read) -> Outcome<String> {
    let bytes = read_bytes(input)?;
    String::from_utf8(bytes).or_else(|_| corrupt("snapshot string is not utf-8"))
}
