/// Test fixtures: representative bodies from the DWR tabular export service.
///
/// These are truncated to the minimum needed to exercise the parser but keep
/// the real shape of a response to:
///   https://dwr.state.co.us/SurfaceWater/data/export_tabular.aspx?ID=...&MTYPE=DISCHRG&...
///
/// Response shape:
///   Station<TAB>Date/Time<TAB>DISCHRG      — header row
///   PLABAICO<TAB>2015-10-01 00:00<TAB>24.1 — one row per reading
///
/// Note: the discharge column is free text. Equipment and ice flags ("Eqp",
/// "Ice") and blanks show up in place of numbers during outages.

/// North Fork South Platte at Bailey, first chunk of water year 2016.
#[cfg(test)]
pub(crate) fn fixture_bailey_first_chunk() -> &'static str {
    "Station\tDate/Time\tDISCHRG\n\
     PLABAICO\t2015-10-01 00:00\t24.1\n\
     PLABAICO\t2015-10-01 00:15\t24.3\n\
     PLABAICO\t2015-10-01 00:30\t24.0\n"
}

/// Same station, next chunk. Begins on the previous chunk's end boundary.
#[cfg(test)]
pub(crate) fn fixture_bailey_second_chunk() -> &'static str {
    "Station\tDate/Time\tDISCHRG\n\
     PLABAICO\t2016-09-30 00:00\t18.6\n\
     PLABAICO\t2016-09-30 00:15\t18.5\n"
}

/// Outage rows: the discharge column carries status flags instead of numbers.
#[cfg(test)]
pub(crate) fn fixture_flagged_values() -> &'static str {
    "Station\tDate/Time\tDISCHRG\n\
     BOCOROCO\t2016-01-05 08:00\tIce\n\
     BOCOROCO\t2016-01-05 08:15\t\n\
     BOCOROCO\t2016-01-05 08:30\t3.4\n\
     BOCOROCO\t2016-01-05 08:45\tEqp\n"
}

/// Rows delivered out of order within one chunk.
#[cfg(test)]
pub(crate) fn fixture_out_of_order() -> &'static str {
    "Station\tDate/Time\tDISCHRG\n\
     BOCOROCO\t2016-05-01 12:30\t51.0\n\
     BOCOROCO\t2016-05-01 12:00\t50.2\n\
     BOCOROCO\t2016-05-01 12:15\t50.7\n"
}

/// Comment preamble and blank lines around an otherwise normal table.
#[cfg(test)]
pub(crate) fn fixture_with_preamble() -> &'static str {
    "# Colorado Division of Water Resources\n\
     # Exported surface water data\n\
     \n\
     Station\tDate/Time\tDISCHRG\n\
     CLAFTCCO\t05/01/2016 06:00\t410\n\
     \n\
     CLAFTCCO\t05/01/2016 06:15\t415\n"
}

/// Rows without a header line.
#[cfg(test)]
pub(crate) fn fixture_missing_header() -> &'static str {
    "PLABAICO\t2015-10-01 00:00\t24.1\n\
     PLABAICO\t2015-10-01 00:15\t24.3\n"
}

/// An extra column appended to every row.
#[cfg(test)]
pub(crate) fn fixture_extra_column() -> &'static str {
    "Station\tDate/Time\tDISCHRG\tFlag\n\
     PLABAICO\t2015-10-01 00:00\t24.1\tP\n"
}

/// HTML error page served with a 200 status for an unknown station.
#[cfg(test)]
pub(crate) fn fixture_html_error_page() -> &'static str {
    "<html><head><title>Error</title></head><body>Station not found</body></html>\n"
}
