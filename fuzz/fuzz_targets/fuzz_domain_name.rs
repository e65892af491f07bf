#![no_main]

use cfzones::types::{DomainName, MAX_DOMAIN_LEN, MAX_LABEL_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(domain) = DomainName::parse(data) {
        // Re-parsing the normalised form should give the same name
        let reparsed = DomainName::parse(domain.as_str());
        assert_eq!(reparsed.as_ref(), Ok(&domain));

        assert!(domain.wire_len() <= MAX_DOMAIN_LEN);
        assert!(domain.labels().all(|l| l.len() <= MAX_LABEL_LEN));
        assert_eq!(domain.as_str(), domain.as_str().to_ascii_lowercase());
    }
});
