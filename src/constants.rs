//! Fixed values shared across the pipeline.

/// Default input pattern: letters annotated with Getty TGN references.
pub const DEFAULT_INPUT_GLOB: &str = "corpus/*TGN.xml";

/// Default output file, written to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "placename-data.csv";

/// Getty Thesaurus of Geographic Names, RDF endpoint.
pub const DEFAULT_VOCAB_BASE_URL: &str = "http://vocab.getty.edu/tgn";

// Markup the extractor consumes
pub const PLACE_NAME_TAG: &str = "placeName";
pub const REFERENCE_ATTR: &str = "ref";
pub const DATE_TAG: &str = "date";
pub const DATE_ATTR: &str = "when-iso";

/// Length of the prefix on a reference attribute, e.g. `tgn/` in `tgn/7000874`.
pub const GETTY_PREFIX_LEN: usize = 4;

/// Position of the date element that records when a letter was written.
/// Letters carry their dispatch date in the second `date` element.
pub const DOCUMENT_DATE_INDEX: usize = 1;

// Fields read from a TGN RDF payload
pub const LATITUDE_FIELD: &str = "latitude";
pub const LONGITUDE_FIELD: &str = "longitude";

/// Column header expected by the DARIAH Geobrowser.
pub const CSV_HEADER: [&str; 8] = [
    "Name",
    "Address",
    "Latitude",
    "Longitude",
    "GettyID",
    "TimeStamp",
    "TimeSpan:begin",
    "TimeSpan:end",
];

pub const USER_AGENT: &str = concat!("tei-placenames/", env!("CARGO_PKG_VERSION"));
