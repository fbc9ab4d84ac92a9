use log::debug;

use crate::record::{Record, StreamProtocol};

/// Reassembles transport fragments into complete numeric records.
///
/// Serial reads and BLE notifications chop the text stream at arbitrary
/// byte boundaries, so a fragment may end mid-token, carry several
/// records, or carry none. The assembler owns the carry-over between
/// calls; one assembler serves exactly one stream, and callers that feed
/// from concurrent transport callbacks must serialize access so fragments
/// apply in arrival order.
#[derive(Debug)]
pub struct FrameAssembler {
    protocol: StreamProtocol,
    carry: String,
    parse_errors: u64,
}

impl FrameAssembler {
    pub fn new(protocol: StreamProtocol) -> Self {
        Self {
            protocol,
            carry: String::new(),
            parse_errors: 0,
        }
    }

    pub fn protocol(&self) -> StreamProtocol {
        self.protocol
    }

    /// Number of records dropped because a field failed to parse.
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }

    /// Appends a fragment and drains every complete record it unlocks.
    ///
    /// Trailing fields short of the protocol arity are retained for the
    /// next call, never emitted, never discarded. A malformed record is
    /// dropped and counted without disturbing the carry-over.
    pub fn feed(&mut self, fragment: &[u8]) -> Vec<Record> {
        self.carry.push_str(&String::from_utf8_lossy(fragment));

        let arity = self.protocol.arity();
        let mut records = Vec::new();

        loop {
            // Only delimiter-terminated tokens are consumable: the tail of
            // the carry-over may be the front half of a split token, and a
            // delimiter at a fragment edge produces an empty token that
            // must not count towards the arity.
            let (parsed, consumed) = {
                let mut fields = Vec::with_capacity(arity);
                let mut consumed = 0;
                let mut token_start = 0;

                for (idx, ch) in self.carry.char_indices() {
                    if matches!(ch, ',' | '\n' | '\r') {
                        let token = self.carry[token_start..idx].trim();
                        if !token.is_empty() {
                            fields.push(token);
                        }
                        token_start = idx + 1;
                        if fields.len() == arity {
                            consumed = token_start;
                            break;
                        }
                    }
                }

                if fields.len() < arity {
                    return records;
                }

                (self.protocol.parse(&fields), consumed)
            };

            self.carry.drain(..consumed);

            match parsed {
                Ok(record) => records.push(record),
                Err(error) => {
                    self.parse_errors += 1;
                    debug!("dropping malformed record: {error}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PpgRecord;

    const PPG_LINE: &str = "IR=50000,RED=45000,IR_AC=120,IR_DC=49800,RED_AC=80,RED_DC=44900,R=0.74\n";

    fn ppg_values(records: &[Record]) -> Vec<PpgRecord> {
        records
            .iter()
            .map(|r| match r {
                Record::Ppg(p) => *p,
                Record::Imu(_) => panic!("expected PPG record"),
            })
            .collect()
    }

    #[test]
    fn single_complete_fragment() {
        let mut assembler = FrameAssembler::new(StreamProtocol::PpgKeyValue);
        let records = assembler.feed(PPG_LINE.as_bytes());
        assert_eq!(records.len(), 1);
        assert_eq!(ppg_values(&records)[0].ir, 50000.0);
        assert_eq!(assembler.parse_errors(), 0);
    }

    #[test]
    fn fragment_with_multiple_records() {
        let mut assembler = FrameAssembler::new(StreamProtocol::PpgKeyValue);
        let stream = PPG_LINE.repeat(3);
        let records = assembler.feed(stream.as_bytes());
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn fragment_with_zero_complete_records_grows_carry() {
        let mut assembler = FrameAssembler::new(StreamProtocol::PpgKeyValue);
        assert!(assembler.feed(b"IR=50000,RED=45").is_empty());
        assert!(assembler.feed(b"000,IR_AC=120").is_empty());
        let records = assembler.feed(b",IR_DC=49800,RED_AC=80,RED_DC=44900,R=0.74\n");
        assert_eq!(records.len(), 1);
        let ppg = ppg_values(&records)[0];
        assert_eq!(ppg.red, 45000.0);
        assert_eq!(ppg.r, 0.74);
    }

    #[test]
    fn split_invariance_across_fragmentations() {
        let stream = PPG_LINE.repeat(10);
        let mut reference = FrameAssembler::new(StreamProtocol::PpgKeyValue);
        let expected = ppg_values(&reference.feed(stream.as_bytes()));
        assert_eq!(expected.len(), 10);

        for chunk_size in [1, 2, 3, 5, 7, 11, 16, 64] {
            let mut assembler = FrameAssembler::new(StreamProtocol::PpgKeyValue);
            let mut records = Vec::new();
            for chunk in stream.as_bytes().chunks(chunk_size) {
                records.extend(assembler.feed(chunk));
            }
            assert_eq!(
                ppg_values(&records),
                expected,
                "chunk size {chunk_size} changed the record sequence"
            );
            assert_eq!(assembler.parse_errors(), 0);
        }
    }

    #[test]
    fn trailing_delimiter_does_not_desync_arity() {
        let mut assembler = FrameAssembler::new(StreamProtocol::ImuPositional);
        assert!(assembler.feed(b"0.1,0.2,0.3,").is_empty());
        let records = assembler.feed(b"1.0,2.0,3.0,");
        assert_eq!(records.len(), 1);
        let Record::Imu(imu) = &records[0] else {
            panic!("expected IMU record");
        };
        assert_eq!(imu.acc_x, 0.1);
        assert_eq!(imu.gyr_z, 3.0);
    }

    #[test]
    fn malformed_record_dropped_without_corrupting_carry() {
        let mut assembler = FrameAssembler::new(StreamProtocol::ImuPositional);
        // First record has a non-numeric field; the stream recovers on the next.
        let records = assembler.feed(b"0.1,0.2,bad,0.4,0.5,0.6,1.0,2.0,3.0,4.0,5.0,6.0\n");
        assert_eq!(records.len(), 1);
        assert_eq!(assembler.parse_errors(), 1);
        let Record::Imu(imu) = &records[0] else {
            panic!("expected IMU record");
        };
        assert_eq!(imu.acc_x, 1.0);
        assert_eq!(imu.gyr_z, 6.0);
    }

    #[test]
    fn malformed_record_split_across_fragments() {
        let mut assembler = FrameAssembler::new(StreamProtocol::PpgKeyValue);
        assert!(assembler.feed(b"IR=50000,RED=4500").is_empty());
        assert!(assembler.feed(b"0,bad=x,IR_AC=12").is_empty());
        let records = assembler.feed(
            b"0,IR_DC=49800,RED_AC=80,RED_DC=44900,R=0.74,\
              IR=51000,RED=46000,IR_AC=130,IR_DC=50800,RED_AC=85,RED_DC=45900,R=0.71\n",
        );
        // The window containing `bad=x` is dropped; the next record parses.
        assert_eq!(assembler.parse_errors(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(ppg_values(&records)[0].ir, 51000.0);
    }

    #[test]
    fn non_utf8_bytes_do_not_poison_the_stream() {
        let mut assembler = FrameAssembler::new(StreamProtocol::ImuPositional);
        let records = assembler.feed(b"\xFF\xFE,1.0,2.0,3.0,4.0,5.0,6.0,7.0\n");
        // The mangled token makes one record unparseable; the arity window
        // advances and the stream stays alive.
        assert_eq!(assembler.parse_errors(), 1);
        assert!(records.is_empty());
        let records = assembler.feed(b"1.0,2.0,3.0,4.0,5.0,\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn blank_lines_between_records_are_ignored() {
        let mut assembler = FrameAssembler::new(StreamProtocol::PpgKeyValue);
        let stream = format!("\r\n\n{PPG_LINE}\r\n\r\n{PPG_LINE}\n\n");
        let records = assembler.feed(stream.as_bytes());
        assert_eq!(records.len(), 2);
        assert_eq!(assembler.parse_errors(), 0);
    }
}
