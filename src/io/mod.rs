// SPDX-License-Identifier: AGPL-3.0-or-later
//! File input/output: solar-table CSVs in, detection reports out.

pub mod report;
pub mod solar;
