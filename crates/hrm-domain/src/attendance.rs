//! Attendance domain types.

wire_enum! {
    /// Outcome recorded for one employee on one day.
    AttendanceStatus as "attendance status" {
        Present => "present",
        Absent => "absent",
        Late => "late",
        HalfDay => "half_day",
    }
}
