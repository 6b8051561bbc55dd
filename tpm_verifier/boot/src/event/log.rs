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

//! Event Log Decoding
//!
//! `EventLogDecoder` walks a raw measurement log one record at a time. The first record is
//! always in the SHA-1 layout; if it carries a Spec-ID header the rest of the log is read in
//! the crypto-agile layout, otherwise the whole log is a legacy SHA-1 log.
//!
//! Decoding stops at the first error. `EventLog::parse` keeps the records decoded before that
//! point next to the error so callers can still inspect them.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, error, info};
use tpm_common_verifier::TpmError;
use crate::byte_reader::ByteReader;
use crate::event::model::{EventRecord, SpecIdHeader};
use crate::event::parser::{decode_spec_id, decode_v1, decode_v2, is_spec_id_event, DecoderLimits};

#[derive(Debug, Clone)]
enum DecoderState {
    AwaitingHeader,
    Legacy,
    Streaming(SpecIdHeader),
    Finished,
}

/// Streaming record decoder.
///
/// Yields `Ok(record)` for each record and at most one `Err`, after which it is exhausted.
pub struct EventLogDecoder<'a> {
    reader: ByteReader<'a>,
    state: DecoderState,
    limits: DecoderLimits,
    spec_id: Option<SpecIdHeader>,
    event_number: u32,
}

impl<'a> EventLogDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, DecoderLimits::default())
    }

    pub fn with_limits(data: &'a [u8], limits: DecoderLimits) -> Self {
        Self {
            reader: ByteReader::new(data),
            state: DecoderState::AwaitingHeader,
            limits,
            spec_id: None,
            event_number: 0,
        }
    }

    /// The Spec-ID header, once the first record has been decoded from a crypto-agile log
    pub fn spec_id(&self) -> Option<&SpecIdHeader> {
        self.spec_id.as_ref()
    }

    /// Number of records decoded so far
    pub fn event_number(&self) -> u32 {
        self.event_number
    }

    /// Byte offset of the next unread record
    pub fn offset(&self) -> u64 {
        self.reader.position()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, DecoderState::Finished)
    }

    /// Decodes the next record.
    ///
    /// # Errors
    /// * `TpmError::Structure` naming the record number and field that failed
    pub fn next_record(&mut self) -> Result<Option<EventRecord>, TpmError> {
        let result = self.step();
        match &result {
            Ok(Some(_)) => self.event_number += 1,
            Ok(None) => self.state = DecoderState::Finished,
            Err(e) => {
                error!("event log decoding stopped at offset {}: {}", self.reader.position(), e);
                self.state = DecoderState::Finished;
            }
        }
        result
    }

    fn step(&mut self) -> Result<Option<EventRecord>, TpmError> {
        let number = self.event_number;
        let at_record = move |e: TpmError| e.in_field(format!("event {}", number));

        match &self.state {
            DecoderState::Finished => Ok(None),
            DecoderState::AwaitingHeader => {
                let Some(first) = decode_v1(&mut self.reader, &self.limits).map_err(at_record)? else {
                    debug!("empty event log");
                    return Ok(None);
                };
                if is_spec_id_event(&first) {
                    let header = decode_spec_id(&first.event_data).map_err(at_record)?;
                    info!("crypto agile event log, {} algorithm(s) declared", header.number_of_algorithms());
                    self.spec_id = Some(header.clone());
                    self.state = DecoderState::Streaming(header);
                } else {
                    info!("legacy SHA-1 event log");
                    self.state = DecoderState::Legacy;
                }
                Ok(Some(EventRecord::V1(first)))
            }
            DecoderState::Legacy => Ok(decode_v1(&mut self.reader, &self.limits)
                .map_err(at_record)?
                .map(EventRecord::V1)),
            DecoderState::Streaming(header) => Ok(decode_v2(&mut self.reader, header, &self.limits)
                .map_err(at_record)?
                .map(EventRecord::V2)),
        }
    }
}

impl Iterator for EventLogDecoder<'_> {
    type Item = Result<EventRecord, TpmError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl std::iter::FusedIterator for EventLogDecoder<'_> {}

/// A fully decoded measurement log.
///
/// `error` is set when decoding stopped early; `records` then holds everything decoded before
/// the failing record.
#[derive(Debug, Clone)]
pub struct EventLog {
    pub spec_id: Option<SpecIdHeader>,
    pub records: Vec<EventRecord>,
    pub error: Option<TpmError>,
}

impl EventLog {
    pub fn parse(data: &[u8]) -> Self {
        Self::parse_with_limits(data, DecoderLimits::default())
    }

    pub fn parse_with_limits(data: &[u8], limits: DecoderLimits) -> Self {
        let mut decoder = EventLogDecoder::with_limits(data, limits);
        let mut records = Vec::new();
        let mut error = None;
        for item in decoder.by_ref() {
            match item {
                Ok(record) => records.push(record),
                Err(e) => error = Some(e),
            }
        }
        info!("decoded {} event(s) from {} bytes", records.len(), data.len());
        Self {
            spec_id: decoder.spec_id,
            records,
            error,
        }
    }

    /// Decodes a Base64 encoded log, the form in which agents usually ship it
    ///
    /// # Errors
    /// * `TpmError::Structure` if the input is not valid Base64
    pub fn parse_base64(encoded: &str, limits: DecoderLimits) -> Result<Self, TpmError> {
        let data = BASE64.decode(encoded.trim())
            .map_err(|e| TpmError::structure("event log", format!("Failed to decode Base64 data: {}", e)))?;
        Ok(Self::parse_with_limits(&data, limits))
    }

    pub fn is_crypto_agile(&self) -> bool {
        self.spec_id.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Turns a partially decoded log into its error
    pub fn into_result(self) -> Result<Self, TpmError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}
