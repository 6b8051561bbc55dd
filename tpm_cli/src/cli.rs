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

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tpm_common_verifier::AlgorithmId;

#[derive(Parser)]
#[clap(author, version, about = "TPM2 measurement log replay and policy digest tools", long_about = None)]
pub struct Cli {
    /// Configuration file, defaults apply when absent
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level, including intermediate digests
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a measurement log and replay it into PCR values
    Eventextend {
        /// Binary measurement log
        #[clap(short, long)]
        input: PathBuf,

        /// PCR bank to replay: sha1, sha256, sha384, sha512 or sm3
        #[clap(long)]
        hash_alg: Option<AlgorithmId>,

        /// Highest PCR index replayed
        #[clap(long)]
        pcr_max: Option<u32>,

        /// Print every decoded event
        #[clap(long)]
        print_events: bool,

        /// PCR values read from the TPM, JSON, to compare against the replay
        #[clap(long)]
        expected: Option<PathBuf>,

        /// The input file holds Base64 text instead of raw bytes
        #[clap(long)]
        base64: bool,
    },

    /// Build a policy digest from hex terms, one per line
    Policymaker {
        /// Term file
        #[clap(short, long)]
        input: PathBuf,

        /// Policy hash algorithm
        #[clap(long)]
        hash_alg: Option<AlgorithmId>,

        /// Start from an empty buffer instead of the zero digest; later lines still chain
        #[clap(long)]
        nz: bool,

        /// Write the binary digest to this file
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Print the digest as hex
        #[clap(short, long)]
        print: bool,
    },

    /// Build a PolicyPCR term from a PCR mask and PCR values
    Policymakerpcr {
        /// Hex PCR mask, 010000 selects PCR 16
        #[clap(long)]
        bm: String,

        /// PCR values, one hex value per line in ascending PCR order
        #[clap(short, long)]
        input: Option<PathBuf>,

        /// PCR bank of the selection
        #[clap(long)]
        hash_alg: Option<AlgorithmId>,

        /// Write the term as a hex line to this file
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Print the term
        #[clap(short, long)]
        print: bool,
    },

    /// Compute the PolicySigned aHash to be signed by the authorizing key
    PolicysignedAhash {
        /// nonceTPM, binary
        #[clap(long)]
        nonce: Option<PathBuf>,

        /// cpHashA, binary
        #[clap(long)]
        cp_hash: Option<PathBuf>,

        /// policyRef, binary
        #[clap(long)]
        policy_ref: Option<PathBuf>,

        /// Expiration in seconds, negative values request a ticket
        #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
        expiration: i32,

        /// Hash algorithm of the signing scheme
        #[clap(long)]
        hash_alg: Option<AlgorithmId>,

        /// Write the binary aHash to this file
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}
