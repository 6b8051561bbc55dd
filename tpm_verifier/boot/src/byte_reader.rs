/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

//! Byte Reader Module
//!
//! Bounded little-endian cursor over a measurement log buffer. All integer fields of the TCG
//! PC Client event log are little-endian regardless of host byte order.
//!
//! The module contains two main components:
//! - `ByteReader`: A byte stream reader providing fixed-width integer and byte-array reads
//! - `ByteParseable`: A parseable trait; types implementing this trait can be parsed directly from byte streams

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use tpm_common_verifier::TpmError;

/// Binary data parsing helper structure
///
/// Every read checks the remaining length first and fails with `TpmError::InsufficientData`
/// without moving the position, so a failed read never consumes a partial field.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

/// Trait for types that can be parsed from a byte stream
///
/// # Example
///
/// ```rust ignore
/// use tpm_boot_verifier::{ByteReader, ByteParseable};
/// use tpm_common_verifier::TpmError;
///
/// struct MyStruct {
///     field1: u32,
///     field2: u8,
/// }
///
/// impl ByteParseable for MyStruct {
///     fn parse_from(parser: &mut ByteReader) -> Result<Self, TpmError> {
///         let field1 = parser.read_u32()?;
///         let field2 = parser.read_u8()?;
///         Ok(Self { field1, field2 })
///     }
/// }
/// ```
pub trait ByteParseable: Sized {
    /// Parse an instance of the current type from a byte reader
    ///
    /// # Errors
    ///
    /// Returns a TpmError when the byte stream contains insufficient data or is incorrectly formatted
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, TpmError>;
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current reading position (byte offset)
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Number of unread bytes remaining
    pub fn remaining(&self) -> u64 {
        let total: u64 = self.cursor.get_ref().len() as u64;
        total.saturating_sub(self.cursor.position())
    }

    pub fn is_end(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, field: &str, needed: u64) -> Result<(), TpmError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(TpmError::InsufficientData {
                field: field.to_string(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, TpmError> {
        self.ensure("u8", 1)?;
        self.cursor.read_u8()
            .map_err(|e| TpmError::InternalError(format!("Failed to read u8: {}", e)))
    }

    /// Read a u16 value (little-endian)
    pub fn read_u16(&mut self) -> Result<u16, TpmError> {
        self.ensure("u16", 2)?;
        self.cursor.read_u16::<LittleEndian>()
            .map_err(|e| TpmError::InternalError(format!("Failed to read u16: {}", e)))
    }

    /// Read a u32 value (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, TpmError> {
        self.ensure("u32", 4)?;
        self.cursor.read_u32::<LittleEndian>()
            .map_err(|e| TpmError::InternalError(format!("Failed to read u32: {}", e)))
    }

    /// Read bytes of specified length
    ///
    /// The length is checked against the remaining data before anything is allocated.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, TpmError> {
        self.ensure("byte array", length as u64)?;
        let mut buffer: Vec<u8> = vec![0u8; length];
        self.cursor.read_exact(&mut buffer)
            .map_err(|e| TpmError::InternalError(format!("Failed to read bytes: {}", e)))?;
        Ok(buffer)
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TpmError> {
        self.ensure("byte array", N as u64)?;
        let mut buffer = [0u8; N];
        self.cursor.read_exact(&mut buffer)
            .map_err(|e| TpmError::InternalError(format!("Failed to read bytes: {}", e)))?;
        Ok(buffer)
    }
}
