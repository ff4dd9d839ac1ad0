use multipart_formdata::{
    parse_part, Boundary, ParseError, Part, PartIterator, MAX_BOUNDARY_LEN, MAX_NAME_LEN,
};

fn field_part(boundary: &str, name: &str, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    out.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
    );
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
    out
}

fn file_part(
    boundary: &str,
    name: &str,
    filename: &str,
    content_type: &str,
    value: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    out.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
    out
}

fn close_body(boundary: &str) -> Vec<u8> {
    format!("--{boundary}--\r\n").into_bytes()
}

fn collect_parts<'a>(boundary: &'a Boundary, body: &'a [u8]) -> Vec<Part<'a>> {
    PartIterator::new(boundary, body)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn minimal_single_field_body() {
    let boundary = Boundary::from_content_type("multipart/form-data; boundary=X").unwrap();
    let body = b"--X\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\nhello\r\n--X--\r\n";

    let (part, next) = parse_part(&boundary, body, 0).unwrap();
    assert_eq!(part.name, "f");
    assert!(part.filename.is_empty());
    assert!(part.content_type.is_empty());
    assert_eq!(part.data, b"hello");
    assert_eq!(next, None);
}

#[test]
fn round_trip_mixed_form() {
    let token = "----WebKitFormBoundary7MA4YWxkTrZu0gW";
    let boundary =
        Boundary::from_content_type(&format!("multipart/form-data; boundary={token}")).unwrap();

    let mut body = Vec::new();
    body.extend_from_slice(&field_part(token, "title", b"holiday photo"));
    body.extend_from_slice(&field_part(token, "tags", b"beach,sunset"));
    body.extend_from_slice(&file_part(
        token,
        "upload",
        "sunset.jpg",
        "image/jpeg",
        b"\xff\xd8\xff\xe0fake jpeg bytes",
    ));
    body.extend_from_slice(&close_body(token));

    let parts = collect_parts(&boundary, &body);
    assert_eq!(parts.len(), 3);

    assert_eq!(parts[0].name, "title");
    assert_eq!(parts[0].data, b"holiday photo");
    assert!(!parts[0].is_file());

    assert_eq!(parts[1].name, "tags");
    assert_eq!(parts[1].data, b"beach,sunset");

    assert_eq!(parts[2].name, "upload");
    assert_eq!(parts[2].filename, "sunset.jpg");
    assert_eq!(parts[2].content_type, "image/jpeg");
    assert_eq!(parts[2].data, b"\xff\xd8\xff\xe0fake jpeg bytes");
    assert!(parts[2].is_file());
}

#[test]
fn parts_borrow_from_body() {
    let boundary = Boundary::from_token("B").unwrap();
    let mut body = field_part("B", "f", b"zero copy");
    body.extend_from_slice(&close_body("B"));

    let parts = collect_parts(&boundary, &body);
    let data = parts[0].data;
    let body_range = body.as_ptr() as usize..body.as_ptr() as usize + body.len();
    assert!(body_range.contains(&(data.as_ptr() as usize)));
}

#[test]
fn many_parts_in_order() {
    let boundary = Boundary::from_token("bulk").unwrap();
    let mut body = Vec::new();
    for i in 0..50 {
        body.extend_from_slice(&field_part("bulk", &format!("f{i}"), format!("v{i}").as_bytes()));
    }
    body.extend_from_slice(&close_body("bulk"));

    let parts = collect_parts(&boundary, &body);
    assert_eq!(parts.len(), 50);
    for (i, part) in parts.iter().enumerate() {
        assert_eq!(part.name, format!("f{i}"));
        assert_eq!(part.data, format!("v{i}").as_bytes());
    }
}

#[test]
fn binary_payload_round_trip() {
    let boundary = Boundary::from_token("bin").unwrap();
    let payload: Vec<u8> = (0u16..256).map(|b| b as u8).collect();
    let mut body = file_part("bin", "blob", "blob.dat", "application/octet-stream", &payload);
    body.extend_from_slice(&close_body("bin"));

    let parts = collect_parts(&boundary, &body);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].data, &payload[..]);
}

#[test]
fn unknown_headers_between_known_ones() {
    let boundary = Boundary::from_token("X").unwrap();
    let body = b"--X\r\n\
        X-Custom: value\r\n\
        Content-Disposition: form-data; name=\"f\"; filename=\"a.bin\"\r\n\
        X-Trace-Id: 1234\r\n\
        Content-Type: application/octet-stream\r\n\
        \r\n\
        data\r\n\
        --X--\r\n";

    let parts = collect_parts(&boundary, body);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "f");
    assert_eq!(parts[0].filename, "a.bin");
    assert_eq!(parts[0].content_type, "application/octet-stream");
    assert_eq!(parts[0].data, b"data");
}

#[test]
fn boundary_token_over_70_chars_truncated() {
    let token = "a".repeat(120);
    let boundary =
        Boundary::from_content_type(&format!("multipart/form-data; boundary={token}")).unwrap();
    assert_eq!(boundary.len(), MAX_BOUNDARY_LEN);

    // A body framed with the truncated delimiter still parses.
    let full_delim = format!("--{token}");
    let wire_token = &full_delim[2..MAX_BOUNDARY_LEN];
    let mut body = field_part(wire_token, "f", b"v");
    body.extend_from_slice(&close_body(wire_token));
    let parts = collect_parts(&boundary, &body);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].data, b"v");
}

#[test]
fn overlong_field_name_truncated() {
    let boundary = Boundary::from_token("X").unwrap();
    let long = "n".repeat(100);
    let mut body = field_part("X", &long, b"v");
    body.extend_from_slice(&close_body("X"));

    let parts = collect_parts(&boundary, &body);
    assert_eq!(parts[0].name, "n".repeat(MAX_NAME_LEN));
}

#[test]
fn content_type_only_part_rejected() {
    let boundary = Boundary::from_token("X").unwrap();
    let body = b"--X\r\nContent-Type: text/plain\r\n\r\ndata\r\n--X--\r\n";

    let results: Vec<_> = PartIterator::new(&boundary, body).collect();
    assert_eq!(results, vec![Err(ParseError::MissingContentDisposition)]);
}

#[test]
fn corrupted_terminator_rejected() {
    let boundary = Boundary::from_token("X").unwrap();
    let mut body = field_part("X", "f", b"hello");
    body.extend_from_slice(&close_body("X"));
    // Corrupt the CRLF immediately preceding the closing boundary.
    let pos = body.len() - close_body("X").len() - 2;
    body[pos] = b'_';
    body[pos + 1] = b'_';

    let err = parse_part(&boundary, &body, 0).unwrap_err();
    assert_eq!(err, ParseError::MissingDataTerminator);
}

#[test]
fn error_in_second_part_stops_iteration() {
    let boundary = Boundary::from_token("X").unwrap();
    let mut body = field_part("X", "good", b"1");
    body.extend_from_slice(b"--X\r\nbroken header line\r\n\r\n2\r\n");
    body.extend_from_slice(&close_body("X"));

    let mut it = PartIterator::new(&boundary, &body);
    assert!(matches!(it.next(), Some(Ok(ref p)) if p.name == "good"));
    assert_eq!(it.next(), Some(Err(ParseError::InvalidHeaderField)));
    assert_eq!(it.next(), None);
}

#[test]
fn missing_terminal_marker_after_last_part() {
    // A final boundary with neither `--` nor a following part is rejected
    // rather than mis-signalling a continuation.
    let boundary = Boundary::from_token("X").unwrap();
    let body = b"--X\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\nhello\r\n--X\r\n";

    let results: Vec<_> = PartIterator::new(&boundary, body).collect();
    // The part itself frames fine; the follow-up call finds no next part.
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

#[test]
fn preamble_before_first_boundary_skipped() {
    // Scanning starts at the first delimiter occurrence, so a preamble
    // (RFC 2046 allows one) falls away on its own.
    let boundary = Boundary::from_token("X").unwrap();
    let mut body = b"this preamble should be ignored\r\n".to_vec();
    body.extend_from_slice(&field_part("X", "f", b"v"));
    body.extend_from_slice(&close_body("X"));

    let parts = collect_parts(&boundary, &body);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "f");
}
