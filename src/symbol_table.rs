//! The assembler's symbol table.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::{Error, ErrorKind, Result};

/// The first RAM address handed out to variables.
pub const FIRST_VARIABLE_ADDRESS: u16 = 16;

pub const SCREEN_ADDRESS: u16 = 16384;
pub const KEYBOARD_ADDRESS: u16 = 24576;

lazy_static! {
    static ref PREDEFINED: Vec<(String, u16)> = {
        let mut symbols = vec![
            ("SP".to_string(), 0),
            ("LCL".to_string(), 1),
            ("ARG".to_string(), 2),
            ("THIS".to_string(), 3),
            ("THAT".to_string(), 4),
            ("SCREEN".to_string(), SCREEN_ADDRESS),
            ("KBD".to_string(), KEYBOARD_ADDRESS),
        ];

        symbols.extend((0..16).map(|r| (format!("R{}", r), r)));
        symbols
    };
}

/// How a symbol came to be in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Reserved by the architecture.
    Predefined,
    /// Declared with `(LABEL)`, points into ROM.
    Label,
    /// Allocated on first use, points into RAM.
    Variable,
}

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub address: u16,
    pub kind: SymbolKind,
}

/// Mapping from symbol names to addresses.
///
/// A fresh table already contains the predefined symbols of the architecture. A name can be
/// added only once.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    inner: HashMap<String, SymbolInfo>,
    /// User symbols in the order they were added.
    order: Vec<String>,
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        let inner = PREDEFINED
            .iter()
            .map(|(name, address)| (name.clone(), SymbolInfo {
                address: *address,
                kind: SymbolKind::Predefined,
            }))
            .collect();

        SymbolTable {
            inner,
            order: Vec::new(),
        }
    }

    /// Adds a label or variable. Fails if the name is already present.
    pub fn add_entry<S: Into<String>>(&mut self, name: S, address: u16, kind: SymbolKind) -> Result<()> {
        let name = name.into();

        if self.inner.contains_key(&name) {
            return Err(Error::new(ErrorKind::DuplicateSymbol { name }));
        }

        self.inner.insert(name.clone(), SymbolInfo { address, kind });
        self.order.push(name);

        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn get_address(&self, name: &str) -> Result<u16> {
        self.inner
            .get(name)
            .map(|info| info.address)
            .ok_or_else(|| Error::new(ErrorKind::UnknownSymbol { name: name.to_string() }))
    }

    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.inner.get(name)
    }

    /// Iterates over the user defined symbols in the order they were added.
    pub fn user_symbols(&self) -> impl Iterator<Item = (&str, &SymbolInfo)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), &self.inner[name]))
    }
}
