use crate::test_helpers::factories::TimestampFactory;

#[test]
fn minute_and_second_offsets_share_the_base() {
    assert_eq!(TimestampFactory::minute(0), TimestampFactory::base());
    assert_eq!(TimestampFactory::minute(2), TimestampFactory::second(120));
    assert_eq!(
        TimestampFactory::base(),
        TimestampFactory::utc_datetime(2021, 6, 1, 0, 0, 0)
    );
}
