/// Bytes rendered per dump line
pub const BYTES_PER_LINE: usize = 16;

/// Width of the hex column: 16 pairs separated by single spaces
const HEX_WIDTH: usize = BYTES_PER_LINE * 3 - 1;

/// Render a read chunk as hex/ASCII lines.
///
/// Each line holds up to 16 bytes as uppercase hex pairs, padded with
/// blanks to full width, followed by two spaces and the printable-ASCII
/// view with `.` for anything outside `0x20..=0x7E`.
pub fn hex_dump(bytes: &[u8]) -> Vec<String> {
    bytes.chunks(BYTES_PER_LINE).map(dump_line).collect()
}

fn dump_line(chunk: &[u8]) -> String {
    let hex = chunk
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<String>>()
        .join(" ");

    let ascii: String = chunk
        .iter()
        .map(|&b| {
            if (32..=126).contains(&b) {
                b as char
            } else {
                '.'
            }
        })
        .collect();

    format!("{:<width$}  {}", hex, ascii, width = HEX_WIDTH)
}
