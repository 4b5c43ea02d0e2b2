// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Write;

use revisit_core::Fallible;
use revisit_core::ReviewFeedback;
use revisit_core::ScheduleResult;
use revisit_core::ScheduleState;
use revisit_core::Timestamp;
use revisit_core::fail;
use revisit_core::schedule;
use revisit_core::scheduler::MIN_EASE_FACTOR;

/// Run the scheduler once, without touching the database, and print the
/// result as JSON.
pub fn print_schedule(
    feedback: &str,
    state: ScheduleState,
    now: Timestamp,
    out: &mut impl Write,
) -> Fallible<ScheduleResult> {
    let feedback = ReviewFeedback::try_from(feedback.to_string())?;
    if state.interval < 1 {
        return fail("interval must be at least 1 day");
    }
    if !state.ease_factor.is_finite() || state.ease_factor < MIN_EASE_FACTOR {
        return fail(format!(
            "ease factor must be at least {MIN_EASE_FACTOR}, got {}",
            state.ease_factor
        ));
    }
    let result = schedule(
        feedback,
        state.repetitions,
        state.ease_factor,
        state.interval,
        now,
    );
    serde_json::to_writer_pretty(&mut *out, &result)?;
    writeln!(out)?;
    Ok(result)
}
