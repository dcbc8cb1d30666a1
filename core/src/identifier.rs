/// A task identifier of the form `{campaign_id}_{type}_{hash}_{slot_id}`.
///
/// The hash may itself contain underscores; campaign and type are the first
/// two segments and the slot id is always the trailing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeTaskId<'a> {
    pub raw: &'a str,
    pub campaign_id: &'a str,
    pub kind: &'a str,
    pub hash: &'a str,
    pub slot_id: &'a str,
}

impl<'a> CompositeTaskId<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        let segments: Vec<&str> = raw.split('_').collect();
        if segments.len() < 4 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let campaign_id = segments[0];
        let kind = segments[1];
        let slot_id = segments[segments.len() - 1];
        let hash_start = campaign_id.len() + kind.len() + 2;
        let hash_end = raw.len() - slot_id.len() - 1;

        Some(Self {
            raw,
            campaign_id,
            kind,
            hash: &raw[hash_start..hash_end],
            slot_id,
        })
    }
}

/// Identifier forms to try for one task, full string first.
pub fn task_id_forms(raw: &str) -> Vec<&str> {
    match CompositeTaskId::parse(raw) {
        Some(composite) => vec![composite.raw, composite.slot_id],
        None => vec![raw],
    }
}
