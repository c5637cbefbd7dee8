use std::fmt;

use tracing::info;

/// Progress of one rebooking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebookState {
	Idle,
	NavigatingForm,
	FillingDate,
	FillingTime,
	Submitting,
	Confirming,
	Verifying,
	Succeeded,
	Failed,
}

impl RebookState {
	pub fn is_terminal(self) -> bool {
		matches!(self, RebookState::Succeeded | RebookState::Failed)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RebookState::Idle => "idle",
			RebookState::NavigatingForm => "navigating_form",
			RebookState::FillingDate => "filling_date",
			RebookState::FillingTime => "filling_time",
			RebookState::Submitting => "submitting",
			RebookState::Confirming => "confirming",
			RebookState::Verifying => "verifying",
			RebookState::Succeeded => "succeeded",
			RebookState::Failed => "failed",
		}
	}
}

impl fmt::Display for RebookState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Records and logs every state change of one attempt.
#[derive(Debug)]
pub struct AttemptTracker {
	attempt: u32,
	strategy: &'static str,
	state: RebookState,
	transitions: Vec<(RebookState, RebookState)>,
}

impl AttemptTracker {
	pub fn new(attempt: u32) -> Self {
		Self {
			attempt,
			strategy: "-",
			state: RebookState::Idle,
			transitions: Vec::new(),
		}
	}

	pub fn state(&self) -> RebookState {
		self.state
	}

	pub fn transitions(&self) -> &[(RebookState, RebookState)] {
		&self.transitions
	}

	/// Tags subsequent transitions with the strategy now driving the form.
	pub fn use_strategy(&mut self, strategy: &'static str) {
		self.strategy = strategy;
	}

	pub fn advance(&mut self, next: RebookState) {
		let from = self.state;
		info!(target = "rebook.rebook", attempt = self.attempt, strategy = self.strategy, %from, to = %next, "state transition");
		self.transitions.push((from, next));
		self.state = next;
	}
}
