use std::sync::Arc;

use super::{io, Error};

/// Input ports discovery and connection.
pub struct PortsIn<D: 'static> {
    list: Vec<(Arc<str>, midir::MidiInputPort)>,
    cur: Option<Arc<str>>,
    midi_conn: io::MidiIn<D>,
    client_name: Arc<str>,
}

impl<D: Send + Clone + 'static> PortsIn<D> {
    pub fn try_new(client_name: Arc<str>, data: D) -> Result<Self, Error> {
        Ok(Self {
            list: Vec::new(),
            cur: None,
            midi_conn: io::MidiIn::try_new(&client_name, data)?,
            client_name,
        })
    }

    pub fn list(&self) -> impl Iterator<Item = Arc<str>> + '_ {
        self.list.iter().map(|(name, _)| name.clone())
    }

    pub fn cur(&self) -> Option<Arc<str>> {
        self.cur.clone()
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiInput::new(&format!("{} refresh In ports", self.client_name))?;

        self.list.clear();
        for port in temp_conn.ports().iter() {
            let name = temp_conn.port_name(port)?;
            // Skip our own ports.
            if !name.starts_with(self.client_name.as_ref()) {
                self.list.push((name.into(), port.clone()));
            }
        }

        log::debug!("Found {} MIDI In ports", self.list.len());

        Ok(())
    }

    /// Returns the name of the single port matching `wanted`.
    pub fn find(&self, wanted: &str) -> Result<Arc<str>, Error> {
        let idx = select(self.list.iter().map(|(name, _)| &**name), wanted)?;
        Ok(self.list[idx].0.clone())
    }

    pub fn connect<C>(&mut self, port_name: Arc<str>, callback: C) -> Result<(), Error>
    where
        C: FnMut(u64, &[u8], &mut D) + Send + 'static,
    {
        let port = self
            .list
            .iter()
            .find(|(name, _)| *name == port_name)
            .map(|(_, port)| port.clone())
            .ok_or_else(|| Error::PortNotFound(port_name.clone()))?;

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name, callback)
            .map_err(|err| {
                self.cur = None;
                err
            })?;

        log::info!("Connected for Input to {port_name}");
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected Input from {cur}");
        }
    }
}

/// Checks whether a port named `port_name` is still listed by the backend.
///
/// A fresh client is needed: the port list of a connected client
/// is not refreshed by every backend.
pub fn is_present(client_name: &str, port_name: &str) -> Result<bool, Error> {
    let temp_conn = midir::MidiInput::new(&format!("{client_name} watch In ports"))?;

    for port in temp_conn.ports().iter() {
        if temp_conn.port_name(port)? == port_name {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Selects the single port matching `wanted`.
///
/// Exact name matches take precedence. Otherwise, a port matches
/// if its name contains `wanted`, since some backends decorate port
/// names with the client name and ids, e.g. `Code:Controls 24:0`.
fn select<'a>(names: impl Iterator<Item = &'a str> + Clone, wanted: &str) -> Result<usize, Error> {
    let pick = |matches: Vec<usize>| match matches.as_slice() {
        [] => None,
        [idx] => Some(Ok(*idx)),
        _ => Some(Err(Error::AmbiguousPort {
            name: wanted.into(),
            count: matches.len(),
        })),
    };

    let exact = names
        .clone()
        .enumerate()
        .filter(|(_, name)| *name == wanted)
        .map(|(idx, _)| idx)
        .collect();
    if let Some(res) = pick(exact) {
        return res;
    }

    let partial = names
        .enumerate()
        .filter(|(_, name)| name.contains(wanted))
        .map(|(idx, _)| idx)
        .collect();

    pick(partial).unwrap_or_else(|| Err(Error::PortNotFound(wanted.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins() {
        let names = ["Controls", "Code:Controls 24:0", "Midi Through"];
        assert_eq!(select(names.iter().copied(), "Controls").unwrap(), 0);
    }

    #[test]
    fn decorated_name() {
        let names = ["Midi Through 14:0", "Code:Controls 24:0"];
        assert_eq!(select(names.iter().copied(), "Controls").unwrap(), 1);
    }

    #[test]
    fn not_found() {
        let names = ["Midi Through 14:0"];
        assert!(matches!(
            select(names.iter().copied(), "Controls"),
            Err(Error::PortNotFound(name)) if name.as_ref() == "Controls"
        ));
    }

    #[test]
    fn ambiguous() {
        let names = ["Code:Controls 24:0", "Code:Controls 28:0"];
        assert!(matches!(
            select(names.iter().copied(), "Controls"),
            Err(Error::AmbiguousPort { count: 2, .. })
        ));
    }
}
