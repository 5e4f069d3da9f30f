// Dependency-aware ordering of file records.
//
// Nodes are records, edges are "imports directory D" (to every record in D)
// and "shares a directory with". A record is emitted after everything it
// reaches through those edges, except where a cycle leads back to a record
// that is already on the way: the `seen` memo stops the walk there, so every
// record is emitted exactly once but cycles are not reported.

use crate::gather::FileRecord;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryGroups {
    groups: BTreeMap<String, Vec<usize>>,
}

impl DirectoryGroups {
    pub fn build(records: &[FileRecord]) -> Self {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            groups
                .entry(record.directory().to_string())
                .or_default()
                .push(idx);
        }
        Self { groups }
    }

    pub fn members(&self, directory: &str) -> &[usize] {
        self.groups.get(directory).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// Cursor into a record's successors: the members of each imported directory
// in turn, then the members of its own directory. `import == len` means the
// own directory is being walked.
struct Frame {
    node: usize,
    import: usize,
    member: usize,
}

impl Frame {
    fn new(node: usize) -> Self {
        Self {
            node,
            import: 0,
            member: 0,
        }
    }

    fn next_successor(
        &mut self,
        records: &[FileRecord],
        groups: &DirectoryGroups,
    ) -> Option<usize> {
        let record = &records[self.node];
        while let Some(dir) = record.internal_imports.get(self.import) {
            if let Some(&successor) = groups.members(dir).get(self.member) {
                self.member += 1;
                return Some(successor);
            }
            self.import += 1;
            self.member = 0;
        }
        let successor = groups.members(record.directory()).get(self.member).copied()?;
        self.member += 1;
        Some(successor)
    }
}

pub fn linearize(mut records: Vec<FileRecord>) -> Vec<FileRecord> {
    records.sort_by(|a, b| a.path.cmp(&b.path));
    let groups = DirectoryGroups::build(&records);
    log::debug!(
        "Linearizing {} files across {} directories",
        records.len(),
        groups.len()
    );

    let order = emission_order(&records, &groups);

    let mut slots: Vec<Option<FileRecord>> = records.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

// `records` must already be sorted by path.
pub fn emission_order(records: &[FileRecord], groups: &DirectoryGroups) -> Vec<usize> {
    let mut seen = vec![false; records.len()];
    let mut order = Vec::with_capacity(records.len());
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..records.len() {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        stack.push(Frame::new(root));

        while let Some(frame) = stack.last_mut() {
            match frame.next_successor(records, groups) {
                Some(successor) => {
                    if !seen[successor] {
                        seen[successor] = true;
                        stack.push(Frame::new(successor));
                    }
                }
                None => {
                    order.push(frame.node);
                    stack.pop();
                }
            }
        }
    }

    order
}
