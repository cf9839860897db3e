// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Last second that RFC3339 formatting can express: 9999-12-31T23:59:59Z.
const MAX_FORMATTABLE_SECS: u64 = 253_402_300_799;

/// Formats `time` as an ISO-8601 UTC timestamp with second precision,
/// e.g. `2023-11-14T22:13:20Z`.
///
/// Times before the Unix epoch or after the year 9999 are clamped to those bounds.
pub fn format_utc_timestamp(time: SystemTime) -> String {
    let max = UNIX_EPOCH + Duration::from_secs(MAX_FORMATTABLE_SECS);
    let time = if time < UNIX_EPOCH {
        UNIX_EPOCH
    } else if time > max {
        max
    } else {
        time
    };

    humantime::format_rfc3339_seconds(time).to_string()
}
