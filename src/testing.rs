//! In-memory MIDI transport shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Direction, ForwardError, OpenError, PollError};
use crate::midi::MidiMessage;
use crate::port::{InputPort, MidiSubsystem, OutputPort, PortId};

#[derive(Default)]
struct MockState {
    inputs: Vec<String>,
    outputs: Vec<String>,
    open: HashSet<String>,
    opens: Vec<String>,
    closes: Vec<String>,
    pending: HashMap<String, VecDeque<MidiMessage>>,
    sent: HashMap<String, Vec<MidiMessage>>,
    failing_sends: Vec<MidiMessage>,
    failing_polls: bool,
    panicking_polls: bool,
}

/// Tracks every open and close so tests can check port ownership.
#[derive(Clone, Default)]
pub(crate) struct MockSubsystem {
    state: Arc<Mutex<MockState>>,
}

impl MockSubsystem {
    pub(crate) fn with_ports(inputs: &[&str], outputs: &[&str]) -> Self {
        let mock = Self::default();
        {
            let mut s = mock.state.lock();
            s.inputs = inputs.iter().map(|p| p.to_string()).collect();
            s.outputs = outputs.iter().map(|p| p.to_string()).collect();
        }
        mock
    }

    pub(crate) fn inject(&self, input: &str, messages: &[MidiMessage]) {
        let mut s = self.state.lock();
        s.pending
            .entry(input.to_string())
            .or_default()
            .extend(messages.iter().cloned());
    }

    pub(crate) fn sent(&self, output: &str) -> Vec<MidiMessage> {
        self.state.lock().sent.get(output).cloned().unwrap_or_default()
    }

    pub(crate) fn is_open(&self, port: &str) -> bool {
        self.state.lock().open.contains(port)
    }

    pub(crate) fn open_count(&self) -> usize {
        self.state.lock().open.len()
    }

    pub(crate) fn opens(&self) -> Vec<String> {
        self.state.lock().opens.clone()
    }

    pub(crate) fn closes(&self) -> Vec<String> {
        self.state.lock().closes.clone()
    }

    /// Sends of exactly this message fail.
    pub(crate) fn fail_sends_of(&self, message: MidiMessage) {
        self.state.lock().failing_sends.push(message);
    }

    pub(crate) fn set_failing_polls(&self, failing: bool) {
        self.state.lock().failing_polls = failing;
    }

    pub(crate) fn set_panicking_polls(&self, panicking: bool) {
        self.state.lock().panicking_polls = panicking;
    }

    /// Block until `output` has received `n` messages or time runs out.
    pub(crate) fn wait_for_sent(&self, output: &str, n: usize) -> Vec<MidiMessage> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let sent = self.sent(output);
            if sent.len() >= n || Instant::now() > deadline {
                return sent;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn claim(&self, direction: Direction, port: &str) -> Result<(), OpenError> {
        let mut s = self.state.lock();
        let known = match direction {
            Direction::Input => &s.inputs,
            Direction::Output => &s.outputs,
        };
        if !known.iter().any(|p| p == port) {
            return Err(OpenError::NotFound {
                direction,
                port: port.to_string(),
            });
        }
        if !s.open.insert(port.to_string()) {
            return Err(OpenError::Connect {
                direction,
                port: port.to_string(),
                reason: "already in use".to_string(),
            });
        }
        s.opens.push(port.to_string());
        Ok(())
    }
}

/// Block until `cond` holds or two seconds pass.
pub(crate) fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        if Instant::now() > deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    true
}

pub(crate) struct MockInput {
    name: String,
    state: Arc<Mutex<MockState>>,
}

pub(crate) struct MockOutput {
    name: String,
    state: Arc<Mutex<MockState>>,
}

fn release(state: &Mutex<MockState>, name: &str) {
    let mut s = state.lock();
    s.open.remove(name);
    s.closes.push(name.to_string());
}

impl Drop for MockInput {
    fn drop(&mut self) {
        release(&self.state, &self.name);
    }
}

impl Drop for MockOutput {
    fn drop(&mut self) {
        release(&self.state, &self.name);
    }
}

impl InputPort for MockInput {
    fn poll_pending(&mut self) -> Result<Vec<MidiMessage>, PollError> {
        let mut s = self.state.lock();
        if s.panicking_polls {
            drop(s);
            panic!("mock input panicked");
        }
        if s.failing_polls {
            return Err(PollError("device unplugged".to_string()));
        }
        Ok(s
            .pending
            .get_mut(&self.name)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default())
    }
}

impl OutputPort for MockOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<(), ForwardError> {
        let mut s = self.state.lock();
        if s.failing_sends.contains(message) {
            return Err(ForwardError("write failed".to_string()));
        }
        s.sent.entry(self.name.clone()).or_default().push(message.clone());
        Ok(())
    }
}

impl MidiSubsystem for MockSubsystem {
    type Input = MockInput;
    type Output = MockOutput;

    fn list_input_ports(&self) -> Vec<PortId> {
        self.state.lock().inputs.clone()
    }

    fn list_output_ports(&self) -> Vec<PortId> {
        self.state.lock().outputs.clone()
    }

    fn open_input(&self, port: &str) -> Result<MockInput, OpenError> {
        self.claim(Direction::Input, port)?;
        Ok(MockInput {
            name: port.to_string(),
            state: Arc::clone(&self.state),
        })
    }

    fn open_output(&self, port: &str) -> Result<MockOutput, OpenError> {
        self.claim(Direction::Output, port)?;
        Ok(MockOutput {
            name: port.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}
