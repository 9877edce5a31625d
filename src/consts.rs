/// Maximum year accepted when parsing text (inclusive)
pub const MAX_YEAR: i32 = 9999;

/// Minimum year accepted when parsing text (inclusive)
pub const MIN_YEAR: i32 = 1;

/// Last valid month index (December, months are 0-indexed)
pub const MAX_MONTH_INDEX: u8 = 11;

/// Last valid weekday index (Saturday, Sunday is 0)
pub const MAX_WEEKDAY_INDEX: u8 = 6;

/// Every month starts on day 1
pub const MIN_DAY: u8 = 1;

/// Month index for January
pub const JANUARY: u8 = 0;
/// Month index for February
pub const FEBRUARY: u8 = 1;
/// Month index for December
pub const DECEMBER: u8 = 11;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u8 = 29;

/// Days in each month of a common year, indexed by 0-based month
pub const DAYS_IN_MONTH: [u8; 12] = [
    31, // January
    28, // February, 29 in leap years
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Months per year
pub const MONTHS_PER_YEAR: i32 = 12;
/// Days per week
pub const DAYS_PER_WEEK: i64 = 7;

/// Rows in a month grid
pub const GRID_ROWS: usize = 6;
/// Columns in a month grid (one per weekday)
pub const GRID_COLUMNS: usize = 7;
/// Cells in a month grid
pub const GRID_CELLS: usize = GRID_ROWS * GRID_COLUMNS;

/// Years shown on one page of the year grid; pages start at a multiple of this
pub const YEAR_PAGE_SPAN: i32 = 12;

/// Maximum distance, in days, probed in each direction when looking for an
/// enabled date
pub const NEAREST_ENABLED_PROBE_LIMIT: i64 = 366;

/// Successful parses kept by `EnglishFormatter` before its cache is flushed
pub const PARSE_CACHE_CAPACITY: usize = 512;

/// Gregorian leap-year rule: every 4th year, except centuries not divisible by 400
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
pub(crate) const CENTURY_CYCLE: i32 = 100;
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Date component separator (ISO 8601 format)
pub const DATE_SEPARATOR: char = '-';
/// Separator between range endpoints (`2025-04-01/2025-04-30`)
pub const RANGE_SEPARATOR: char = '/';
/// Separator of month-first input (`04/15/2025`)
pub const MONTH_FIRST_SEPARATOR: char = '/';
