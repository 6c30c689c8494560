use std::rc::Rc;

use super::{Constant, Datalist, Datasrc};

fn ints(values: &[i32]) -> Datalist {
    values.iter().map(|&v| Constant::int(v)).collect()
}

#[test]
fn peek_does_not_advance() {
    let mut src = Datasrc::new(Rc::new(ints(&[1, 2])));

    assert_eq!(src.peek(), Some(&Constant::int(1)));
    assert_eq!(src.peek(), Some(&Constant::int(1)));
    assert_eq!(src.next(), Some(Constant::int(1)));
    assert_eq!(src.next(), Some(Constant::int(2)));
    assert_eq!(src.next(), None);
    assert!(!src.more());
}

#[test]
fn push_descends_and_pop_resumes_after_sublist() {
    let data: Datalist = vec![
        Constant::list(ints(&[10, 11])),
        Constant::int(3),
    ]
    .into();
    let mut src = Datasrc::new(Rc::new(data));

    assert!(src.is_sublist());
    src.push();
    assert_eq!(src.depth(), 2);
    assert_eq!(src.next(), Some(Constant::int(10)));
    assert_eq!(src.next(), Some(Constant::int(11)));
    assert!(!src.more());

    src.pop();
    assert_eq!(src.depth(), 1);
    assert_eq!(src.next(), Some(Constant::int(3)));
}

#[test]
fn exhausted_sublist_does_not_fall_through() {
    let data: Datalist = vec![Constant::list(ints(&[1])), Constant::int(2)].into();
    let mut src = Datasrc::new(Rc::new(data));

    src.push();
    src.next();
    assert_eq!(src.peek(), None);
    assert_eq!(src.next(), None);
    src.pop();
}

#[test]
fn spliced_list_is_read_first_then_falls_through() {
    let mut src = Datasrc::new(Rc::new(ints(&[5, 6])));
    src.splice(Rc::new(ints(&[-1])));

    assert_eq!(src.next(), Some(Constant::int(-1)));
    assert_eq!(src.peek(), Some(&Constant::int(5)));
    assert_eq!(src.next(), Some(Constant::int(5)));
    assert_eq!(src.depth(), 1);
    assert_eq!(src.next(), Some(Constant::int(6)));
    assert_eq!(src.next(), None);
}

#[test]
fn push_into_spliced_sublist_pops_back_to_caller_frame() {
    let mut src = Datasrc::new(Rc::new(ints(&[7])));
    let filler: Datalist = vec![Constant::list(ints(&[0, 0]))].into();
    src.splice(Rc::new(filler));

    src.push();
    assert_eq!(src.depth(), 3);
    src.next();
    src.next();
    src.pop();

    assert_eq!(src.depth(), 1);
    assert_eq!(src.next(), Some(Constant::int(7)));
}

#[test]
fn push_list_injects_without_consuming() {
    let mut src = Datasrc::new(Rc::new(ints(&[1])));
    src.push_list(Rc::new(ints(&[9])));

    assert_eq!(src.next(), Some(Constant::int(9)));
    assert_eq!(src.next(), None);
    src.pop();
    assert_eq!(src.next(), Some(Constant::int(1)));
}

#[test]
fn line_tracks_cursor() {
    let data: Datalist = vec![Constant::int(1).at(4), Constant::int(2).at(5)].into();
    let mut src = Datasrc::new(Rc::new(data));

    assert_eq!(src.line(), 4);
    src.next();
    assert_eq!(src.line(), 5);
    src.next();
    assert_eq!(src.line(), 5);
}

#[test]
#[should_panic(expected = "requires a sublist")]
fn push_on_scalar_panics() {
    let mut src = Datasrc::new(Rc::new(ints(&[1])));
    src.push();
}

#[test]
#[should_panic(expected = "without a matching push")]
fn unbalanced_pop_panics() {
    let mut src = Datasrc::new(Rc::new(ints(&[1])));
    src.pop();
}
