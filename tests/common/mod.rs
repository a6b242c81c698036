//! Shared helpers for building binary MARC records in tests.

pub const FIELD_TERMINATOR: u8 = 0x1E;
pub const SUBFIELD_DELIMITER: u8 = 0x1F;
pub const RECORD_TERMINATOR: u8 = 0x1D;

/// Builder assembling a well-formed ISO 2709 binary record.
#[derive(Default)]
pub struct MarcRecordBuilder {
    directory: Vec<u8>,
    data_area: Vec<u8>,
}

impl MarcRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data field with indicators and (code, value) subfields.
    pub fn data_field(mut self, tag: &str, indicators: &[u8; 2], subfields: &[(u8, &str)]) -> Self {
        let mut field = indicators.to_vec();
        for (code, value) in subfields {
            field.push(SUBFIELD_DELIMITER);
            field.push(*code);
            field.extend_from_slice(value.as_bytes());
        }
        field.push(FIELD_TERMINATOR);
        self.push_entry(tag, &field);
        self
    }

    /// Add a control field (no indicators, no subfields).
    pub fn control_field(mut self, tag: &str, value: &str) -> Self {
        let mut field = value.as_bytes().to_vec();
        field.push(FIELD_TERMINATOR);
        self.push_entry(tag, &field);
        self
    }

    /// Add a raw directory slot without any field data, for corrupt-slot
    /// scenarios. The slot must be exactly 12 bytes.
    pub fn raw_directory_slot(mut self, slot: &[u8; 12]) -> Self {
        self.directory.extend_from_slice(slot);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let base_address = 24 + self.directory.len() + 1;
        let record_length = base_address + self.data_area.len() + 1;

        let mut record = Vec::with_capacity(record_length);
        record.extend_from_slice(format!("{record_length:05}").as_bytes());
        record.extend_from_slice(b"nam a22");
        record.extend_from_slice(format!("{base_address:05}").as_bytes());
        record.extend_from_slice(b" i 4500");
        record.extend_from_slice(&self.directory);
        record.push(FIELD_TERMINATOR);
        record.extend_from_slice(&self.data_area);
        record.push(RECORD_TERMINATOR);
        record
    }

    fn push_entry(&mut self, tag: &str, field: &[u8]) {
        let offset = self.data_area.len();
        self.directory.extend_from_slice(tag.as_bytes());
        self.directory
            .extend_from_slice(format!("{:04}", field.len()).as_bytes());
        self.directory
            .extend_from_slice(format!("{offset:05}").as_bytes());
        self.data_area.extend_from_slice(field);
    }
}
